use core::{convert::Infallible, error::Error, marker::PhantomData};

/// Per-element lifecycle used by [GrowableSequence](super::GrowableSequence) when elements are copied into new
/// storage or released.
///
/// Safety:
/// [BITWISE](ElementHooks::BITWISE) may only be `true` when a bitwise copy of a `T` is a valid clone of it and
/// [destroy_element](ElementHooks::destroy_element) does nothing. Containers rely on this to bulk-copy elements
/// and to skip destruction entirely.
pub unsafe trait ElementHooks<T> {
  type CloneError: Error;

  /// Whether elements may be copied with a plain memory copy instead of [clone_element](ElementHooks::clone_element).
  const BITWISE: bool = false;

  fn clone_element(&self, source: &T) -> Result<T, Self::CloneError>;

  fn destroy_element(&self, element: T) {
    drop(element);
  }
}

/// Hooks for plain data: elements are bulk-copied and never destroyed.
#[derive(Debug, Default, Clone, Copy)]
pub struct Trivial;

unsafe impl<T: Copy> ElementHooks<T> for Trivial {
  type CloneError = Infallible;
  const BITWISE: bool = true;

  fn clone_element(&self, source: &T) -> Result<T, Infallible> {
    Ok(*source)
  }

  fn destroy_element(&self, _element: T) {}
}

/// Hooks that defer to the element's own [Clone] and [Drop].
#[derive(Debug, Default, Clone, Copy)]
pub struct Cloned;

unsafe impl<T: Clone> ElementHooks<T> for Cloned {
  type CloneError = Infallible;

  fn clone_element(&self, source: &T) -> Result<T, Infallible> {
    Ok(source.clone())
  }
}

/// Hooks built from a pair of closures.
///
/// ```
/// use growbuf::alloc::{FnHooks, GrowableSequence, Malloc};
///
/// #[derive(Debug)]
/// struct TooLong;
/// # impl core::fmt::Display for TooLong {
/// #   fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result { f.write_str("too long") }
/// # }
/// # impl core::error::Error for TooLong {}
///
/// let hooks = FnHooks::new(
///   |name: &String| if name.len() < 8 { Ok(name.clone()) } else { Err(TooLong) },
///   |name: String| drop(name),
/// );
/// let mut names = GrowableSequence::with_hooks(Malloc, hooks);
/// names.push("ada".to_string()).unwrap();
/// assert_eq!(names.try_clone().unwrap().len(), 1);
/// ```
pub struct FnHooks<C, D, E> {
  clone: C,
  destroy: D,
  error: PhantomData<fn() -> E>,
}

impl<C, D, E> FnHooks<C, D, E> {
  pub fn new<T>(clone: C, destroy: D) -> Self
  where
    C: Fn(&T) -> Result<T, E>,
    D: Fn(T),
  {
    Self {
      clone,
      destroy,
      error: PhantomData,
    }
  }
}

impl<C: Clone, D: Clone, E> Clone for FnHooks<C, D, E> {
  fn clone(&self) -> Self {
    Self {
      clone: self.clone.clone(),
      destroy: self.destroy.clone(),
      error: PhantomData,
    }
  }
}

unsafe impl<T, E: Error, C: Fn(&T) -> Result<T, E>, D: Fn(T)> ElementHooks<T> for FnHooks<C, D, E> {
  type CloneError = E;

  fn clone_element(&self, source: &T) -> Result<T, E> {
    (self.clone)(source)
  }

  fn destroy_element(&self, element: T) {
    (self.destroy)(element)
  }
}

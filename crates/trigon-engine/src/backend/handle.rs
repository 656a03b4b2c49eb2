use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

pub(crate) trait Handle: Copy {
    fn from_raw(raw: u32) -> Self;
    fn into_raw(self) -> u32;
}

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            /// Backend-specific numeric value. Never zero.
            #[inline]
            pub fn raw(self) -> u32 {
                self.0
            }
        }

        impl Handle for $name {
            #[inline]
            fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            #[inline]
            fn into_raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

handle!(
    /// Compiled shader object.
    ShaderId
);
handle!(
    /// Linked program object.
    ProgramId
);
handle!(
    /// Vertex buffer object.
    BufferId
);
handle!(
    /// Vertex attribute descriptor bound to one buffer.
    VertexArrayId
);

/// Handle-keyed storage. Ids start at 1 and are never reused.
pub(crate) struct Slots<H, T> {
    next: u32,
    items: HashMap<u32, T>,
    _handle: PhantomData<H>,
}

impl<H: Handle, T> Slots<H, T> {
    pub(crate) fn new() -> Self {
        Self {
            next: 0,
            items: HashMap::new(),
            _handle: PhantomData,
        }
    }

    pub(crate) fn insert(&mut self, item: T) -> H {
        self.next += 1;
        self.items.insert(self.next, item);
        H::from_raw(self.next)
    }

    pub(crate) fn get(&self, id: H) -> Option<&T> {
        self.items.get(&id.into_raw())
    }

    pub(crate) fn remove(&mut self, id: H) -> Option<T> {
        self.items.remove(&id.into_raw())
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }
}

impl<H: Handle, T> Default for Slots<H, T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_start_at_one_and_increase() {
        let mut slots: Slots<ShaderId, &str> = Slots::new();
        let a = slots.insert("a");
        let b = slots.insert("b");
        assert_eq!(a.raw(), 1);
        assert_eq!(b.raw(), 2);
        assert_eq!(slots.get(a), Some(&"a"));
    }

    #[test]
    fn removed_ids_are_not_reused() {
        let mut slots: Slots<BufferId, u8> = Slots::new();
        let a = slots.insert(1);
        assert_eq!(slots.remove(a), Some(1));
        assert!(slots.get(a).is_none());
        let b = slots.insert(2);
        assert_ne!(a, b);
        assert_eq!(slots.len(), 1);
    }

    #[test]
    fn display_names_the_kind() {
        let mut slots: Slots<ProgramId, ()> = Slots::new();
        let id = slots.insert(());
        assert_eq!(id.to_string(), "ProgramId(1)");
    }
}

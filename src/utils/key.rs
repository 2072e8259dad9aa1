use std::fmt::{self, Display};

/// A dot-joined path of array indices into the source JSON tree, e.g.
/// `"2.1.0"`. Keys are purely diagnostic: they localize errors and never
/// affect semantics. The root expression has the empty key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Key(Vec<usize>);

impl Key {
    pub fn root() -> Self {
        Key(Vec::new())
    }

    pub fn child(&self, index: usize) -> Self {
        let mut path = self.0.clone();
        path.push(index);
        Key(path)
    }

    pub fn make<T>(&self, item: T) -> Keyed<T> {
        Keyed { key: self.clone(), item }
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", index)?;
        }
        Ok(())
    }
}

/// A payload located at a JSON path.
#[derive(Clone, Debug, PartialEq)]
pub struct Keyed<T> {
    pub key: Key,
    pub item: T,
}

impl<T: Display> Display for Keyed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at {})", self.item, self.key)
    }
}

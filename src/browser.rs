//! Generic depth-first traversal of the score trees
//!
//! Every tree node (MXSR, MSR, LPSR, BSR) implements [`Visitable`] for the
//! visitor trait of its tree. [`Browser::browse`] is the whole traversal
//! algorithm:
//!
//! ```text
//! accept_in(visitor)      -> visitor's "start" callback for this node kind
//! browse_data(visitor)    -> a fresh Browser over each child, in insertion order
//! accept_out(visitor)     -> visitor's "end" callback
//! ```
//!
//! Visitor traits give every callback a default no-op body, so a visitor
//! only implements the node kinds it cares about.

use crate::errors::TranslationError;

/// A node that a visitor of type `V` can walk
pub trait Visitable<V: ?Sized> {
    /// Invoke the visitor's start callback for this node kind
    fn accept_in(&self, visitor: &mut V) -> Result<(), TranslationError>;

    /// Invoke the visitor's end callback for this node kind
    fn accept_out(&self, visitor: &mut V) -> Result<(), TranslationError>;

    /// Browse the owned children, in order
    fn browse_data(&self, visitor: &mut V) -> Result<(), TranslationError>;
}

/// Drives one visitor over one node and its descendants
pub struct Browser<'v, V: ?Sized> {
    visitor: &'v mut V,
}

impl<'v, V: ?Sized> Browser<'v, V> {
    pub fn new(visitor: &'v mut V) -> Self {
        Self { visitor }
    }

    pub fn browse<N>(&mut self, node: &N) -> Result<(), TranslationError>
    where
        N: Visitable<V> + ?Sized,
    {
        node.accept_in(self.visitor)?;
        node.browse_data(self.visitor)?;
        node.accept_out(self.visitor)
    }

    /// Browse an optional child, skipping it when absent
    pub fn browse_optional<N>(&mut self, node: Option<&N>) -> Result<(), TranslationError>
    where
        N: Visitable<V>,
    {
        match node {
            Some(node) => self.browse(node),
            None => Ok(()),
        }
    }
}

/// Browse every item of a sequence through a fresh browser, in order
pub fn browse_all<'a, V, N, I>(visitor: &mut V, nodes: I) -> Result<(), TranslationError>
where
    V: ?Sized,
    N: Visitable<V> + 'a,
    I: IntoIterator<Item = &'a N>,
{
    for node in nodes {
        Browser::new(&mut *visitor).browse(node)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Node {
        name: &'static str,
        children: Vec<Node>,
    }

    trait RecordingVisitor {
        fn start(&mut self, _name: &str) {}
        fn end(&mut self, _name: &str) {}
    }

    impl<V: RecordingVisitor + ?Sized> Visitable<V> for Node {
        fn accept_in(&self, visitor: &mut V) -> Result<(), TranslationError> {
            visitor.start(self.name);
            Ok(())
        }

        fn accept_out(&self, visitor: &mut V) -> Result<(), TranslationError> {
            visitor.end(self.name);
            Ok(())
        }

        fn browse_data(&self, visitor: &mut V) -> Result<(), TranslationError> {
            browse_all(visitor, &self.children)
        }
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl RecordingVisitor for Recorder {
        fn start(&mut self, name: &str) {
            self.events.push(format!("+{}", name));
        }
        fn end(&mut self, name: &str) {
            self.events.push(format!("-{}", name));
        }
    }

    struct Silent;
    impl RecordingVisitor for Silent {}

    fn leaf(name: &'static str) -> Node {
        Node { name, children: Vec::new() }
    }

    #[test]
    fn test_pre_and_post_order() {
        let tree = Node {
            name: "root",
            children: vec![
                Node { name: "a", children: vec![leaf("a1")] },
                leaf("b"),
            ],
        };

        let mut recorder = Recorder::default();
        Browser::new(&mut recorder).browse(&tree).unwrap();

        assert_eq!(
            recorder.events,
            vec!["+root", "+a", "+a1", "-a1", "-a", "+b", "-b", "-root"]
        );
    }

    #[test]
    fn test_unimplemented_callbacks_are_no_ops() {
        let tree = Node { name: "root", children: vec![leaf("x")] };
        assert!(Browser::new(&mut Silent).browse(&tree).is_ok());
    }

    #[test]
    fn test_absent_optional_child_is_skipped() {
        let mut recorder = Recorder::default();
        Browser::new(&mut recorder).browse_optional::<Node>(None).unwrap();
        assert!(recorder.events.is_empty());
    }
}

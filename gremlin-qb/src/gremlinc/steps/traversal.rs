use crate::gremlinc::{optimizer, steps::Step};
use std::{fmt, sync::Arc};

/// An immutable, ordered sequence of steps.
///
/// `[Identity]` is the canonical pass-through traversal and `[None]` the canonical
/// always-empty one. Traversals built through [`Traversal::from_steps`] are already
/// optimized.
#[derive(Clone, PartialEq)]
pub struct Traversal {
    steps: Arc<[Step]>,
}

impl Traversal {
    pub fn identity() -> Self {
        Self::single(Step::Identity)
    }

    pub fn none() -> Self {
        Self::single(Step::None)
    }

    pub fn single(step: Step) -> Self {
        Self {
            steps: Arc::from(vec![step]),
        }
    }

    /// Appends every step through the optimizer.
    pub fn from_steps<I: IntoIterator<Item = Step>>(steps: I) -> Self {
        steps
            .into_iter()
            .fold(StepStack::new(), |stack, step| optimizer::append(&stack, step))
            .to_traversal()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn is_identity(&self) -> bool {
        self.steps.iter().all(|step| *step == Step::Identity)
    }

    pub fn is_none(&self) -> bool {
        matches!(self.steps.as_ref(), [Step::None])
    }

    pub fn single_step(&self) -> Option<&Step> {
        match self.steps.as_ref() {
            [step] => Some(step),
            _ => None,
        }
    }

    /// Every step only filters, so the body can be spliced into an outer traversal.
    pub fn is_filter(&self) -> bool {
        self.steps.iter().all(Step::is_filter)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Step> {
        self.steps.iter()
    }
}

impl<'a> IntoIterator for &'a Traversal {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

impl fmt::Debug for Traversal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.steps.iter()).finish()
    }
}

impl fmt::Display for Traversal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            crate::gremlinc::serializer::groovy::render_inline("__", self)
        )
    }
}

#[derive(Debug)]
struct StepNode {
    step: Step,
    prev: Option<Arc<StepNode>>,
}

/// Persistent stack of steps, newest on top. Pushing and popping share the rest of the
/// stack, so every query built from another one costs O(1) and leaves the original
/// untouched.
#[derive(Debug, Clone, Default)]
pub struct StepStack {
    head: Option<Arc<StepNode>>,
    len: usize,
}

impl StepStack {
    pub fn new() -> Self {
        Self { head: None, len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn peek(&self) -> Option<&Step> {
        self.head.as_ref().map(|node| &node.step)
    }

    pub fn push(&self, step: Step) -> Self {
        Self {
            head: Some(Arc::new(StepNode {
                step,
                prev: self.head.clone(),
            })),
            len: self.len + 1,
        }
    }

    pub fn pop(&self) -> Self {
        match &self.head {
            Some(node) => Self {
                head: node.prev.clone(),
                len: self.len - 1,
            },
            None => self.clone(),
        }
    }

    /// Steps from bottom to top.
    pub fn to_vec(&self) -> Vec<Step> {
        let mut steps = Vec::with_capacity(self.len);
        let mut node = self.head.as_deref();
        while let Some(current) = node {
            steps.push(current.step.clone());
            node = current.prev.as_deref();
        }
        steps.reverse();
        steps
    }

    /// An empty stack yields the identity traversal.
    pub fn to_traversal(&self) -> Traversal {
        if self.is_empty() {
            return Traversal::identity();
        }
        Traversal {
            steps: Arc::from(self.to_vec()),
        }
    }
}

impl Drop for StepStack {
    // unlinks uniquely owned nodes iteratively so long chains don't recurse on drop
    fn drop(&mut self) {
        let mut head = self.head.take();
        while let Some(node) = head {
            match Arc::try_unwrap(node) {
                Ok(mut node) => head = node.prev.take(),
                Err(_) => break,
            }
        }
    }
}

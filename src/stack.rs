//! Size-bounded stack used as the working memory of script execution

/// Stack of byte arrays with consensus-defined size limits.
///
/// Callers must check [`Stack::can_push`] before [`Stack::push`], and
/// [`Stack::is_empty`] before [`Stack::pop`] / [`Stack::peek`]; violating
/// either is a bug and panics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stack {
    max_total_size: usize,
    max_item_size: usize,
    items: Vec<Vec<u8>>,
    used_bytes: usize,
}

impl Stack {
    /// # Panics
    ///
    /// If `max_item_size` is zero or larger than `max_total_size`.
    pub fn new(max_total_size: usize, max_item_size: usize) -> Self {
        assert!(max_item_size > 0, "max_item_size must be non-zero");
        assert!(
            max_total_size >= max_item_size,
            "max_total_size must be at least max_item_size"
        );
        Self {
            max_total_size,
            max_item_size,
            items: Vec::new(),
            used_bytes: 0,
        }
    }

    /// Whether `data` fits both the item and the total limit
    pub fn can_push(&self, data: &[u8]) -> bool {
        data.len() <= self.max_item_size && self.used_bytes + data.len() <= self.max_total_size
    }

    pub fn push(&mut self, data: Vec<u8>) {
        assert!(self.can_push(&data), "Stack::push called without checking can_push");
        self.used_bytes += data.len();
        self.items.push(data);
    }

    pub fn pop(&mut self) -> Vec<u8> {
        let item = self.items.pop().expect("Stack::pop called on an empty stack");
        self.used_bytes -= item.len();
        item
    }

    pub fn peek(&self) -> &[u8] {
        self.items.last().expect("Stack::peek called on an empty stack")
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total bytes currently held
    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    /// Items from top to bottom
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.items.iter().rev().map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop() {
        let mut stack = Stack::new(16, 8);
        assert!(stack.is_empty());
        stack.push(vec![1, 2]);
        stack.push(vec![3]);
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.used_bytes(), 3);
        assert_eq!(stack.peek(), &[3]);
        assert_eq!(stack.pop(), vec![3]);
        assert_eq!(stack.pop(), vec![1, 2]);
        assert_eq!(stack.used_bytes(), 0);
    }

    #[test]
    fn test_can_push_limits() {
        let mut stack = Stack::new(10, 4);
        assert!(stack.can_push(&[0; 4]));
        assert!(!stack.can_push(&[0; 5])); // item limit
        stack.push(vec![0; 4]);
        stack.push(vec![0; 4]);
        assert!(stack.can_push(&[0; 2]));
        assert!(!stack.can_push(&[0; 3])); // total limit
    }

    #[test]
    #[should_panic]
    fn test_push_oversized_item_panics() {
        let mut stack = Stack::new(10, 4);
        stack.push(vec![0; 5]);
    }

    #[test]
    #[should_panic]
    fn test_push_over_total_panics() {
        let mut stack = Stack::new(4, 4);
        stack.push(vec![0; 4]);
        stack.push(vec![0]);
    }

    #[test]
    #[should_panic]
    fn test_pop_empty_panics() {
        Stack::new(4, 4).pop();
    }

    #[test]
    #[should_panic]
    fn test_peek_empty_panics() {
        Stack::new(4, 4).peek();
    }

    #[test]
    #[should_panic]
    fn test_zero_item_size_panics() {
        Stack::new(4, 0);
    }

    #[test]
    #[should_panic]
    fn test_item_size_over_total_panics() {
        Stack::new(4, 5);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut stack = Stack::new(16, 8);
        stack.push(vec![1]);
        let mut copy = stack.clone();
        copy.push(vec![2]);
        assert_eq!(stack.len(), 1);
        assert_eq!(copy.len(), 2);
        assert_eq!(copy.iter().collect::<Vec<_>>(), vec![&[2u8][..], &[1u8][..]]);
    }
}

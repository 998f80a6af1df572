//! Operand stack
//!
//! A plain LIFO of [`Value`]s. Popping an empty stack returns `None`; the
//! engine turns that into a located `StackUnderflow`.

use super::value::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperandStack {
    values: Vec<Value>,
}

impl OperandStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    pub fn pop(&mut self) -> Option<Value> {
        self.values.pop()
    }

    pub fn peek(&self) -> Option<&Value> {
        self.values.last()
    }

    /// Remove the first value matching `pred`, searching upward from the bottom.
    pub fn take_first(&mut self, pred: impl Fn(&Value) -> bool) -> Option<Value> {
        let index = self.values.iter().position(pred)?;
        Some(self.values.remove(index))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Bottom-to-top view
    pub fn as_slice(&self) -> &[Value] {
        &self.values
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifo_order() {
        let mut stack = OperandStack::new();
        stack.push(Value::Int(1));
        stack.push(Value::Int(2));
        assert_eq!(stack.peek(), Some(&Value::Int(2)));
        assert_eq!(stack.pop(), Some(Value::Int(2)));
        assert_eq!(stack.pop(), Some(Value::Int(1)));
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn test_take_first_searches_from_the_bottom() {
        let mut stack = OperandStack::new();
        stack.push(Value::Int(1));
        stack.push(Value::Str("a".into()));
        stack.push(Value::Str("b".into()));
        let taken = stack.take_first(|v| matches!(v, Value::Str(_)));
        assert_eq!(taken, Some(Value::Str("a".into())));
        assert_eq!(stack.as_slice(), &[Value::Int(1), Value::Str("b".into())]);
    }
}

//! Keypad calculator feeding the amount to convert.
//!
//! Holds at most one pending binary operation: pressing an operator stores the
//! current display as the left operand, and `=` applies it to whatever has been
//! typed since.

use anyhow::{Result, anyhow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            Operation::Add => a + b,
            Operation::Subtract => a - b,
            Operation::Multiply => a * b,
            Operation::Divide => {
                if b != 0.0 {
                    a / b
                } else {
                    0.0
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Digit(u8),
    Point,
    Op(Operation),
    Equals,
    Percent,
    Clear,
    Delete,
}

impl TryFrom<char> for Key {
    type Error = anyhow::Error;

    fn try_from(c: char) -> Result<Self> {
        Ok(match c {
            '0'..='9' => Key::Digit(c as u8 - b'0'),
            '.' => Key::Point,
            '+' => Key::Op(Operation::Add),
            '-' => Key::Op(Operation::Subtract),
            '*' | '×' | 'x' => Key::Op(Operation::Multiply),
            '/' | '÷' => Key::Op(Operation::Divide),
            '=' => Key::Equals,
            '%' => Key::Percent,
            'C' | 'c' => Key::Clear,
            '<' => Key::Delete,
            other => return Err(anyhow!("Unsupported key: '{}'", other)),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Calculator {
    display: String,
    pending: Option<(f64, Operation)>,
    reset_on_input: bool,
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new()
    }
}

impl Calculator {
    pub fn new() -> Self {
        Self {
            display: "0".to_string(),
            pending: None,
            reset_on_input: false,
        }
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn value(&self) -> f64 {
        self.display.parse().unwrap_or(0.0)
    }

    pub fn pending(&self) -> Option<Operation> {
        self.pending.map(|(_, op)| op)
    }

    /// Presses every key in `keys`, ignoring whitespace.
    pub fn feed(&mut self, keys: &str) -> Result<()> {
        for c in keys.chars().filter(|c| !c.is_whitespace()) {
            self.press(Key::try_from(c)?);
        }
        Ok(())
    }

    pub fn press(&mut self, key: Key) {
        match key {
            Key::Digit(d) => self.input(char::from(b'0' + d.min(9))),
            Key::Point => self.input('.'),
            Key::Op(op) => self.operation(op),
            Key::Equals => self.equals(),
            Key::Percent => {
                let value = self.value() / 100.0;
                self.display = format_value(value);
            }
            Key::Clear => *self = Self::new(),
            Key::Delete => {
                self.display.pop();
                if self.display.is_empty() || self.display == "-" {
                    self.display = "0".to_string();
                }
            }
        }
    }

    fn input(&mut self, c: char) {
        if self.reset_on_input {
            self.display = if c == '.' { "0.".to_string() } else { c.to_string() };
            self.reset_on_input = false;
            return;
        }
        if c == '.' && self.display.contains('.') {
            return;
        }
        if self.display == "0" && c != '.' {
            self.display = c.to_string();
        } else {
            self.display.push(c);
        }
    }

    fn operation(&mut self, op: Operation) {
        self.pending = Some((self.value(), op));
        self.reset_on_input = true;
    }

    fn equals(&mut self) {
        if let Some((lhs, op)) = self.pending.take() {
            self.display = format_value(op.apply(lhs, self.value()));
        }
    }
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(keys: &str) -> Calculator {
        let mut calc = Calculator::new();
        calc.feed(keys).unwrap();
        calc
    }

    #[test]
    fn test_digit_entry() {
        assert_eq!(run("").display(), "0");
        assert_eq!(run("0012").display(), "12");
        assert_eq!(run("1.5.2").display(), "1.52");
        assert_eq!(run(".5").display(), "0.5");
    }

    #[test]
    fn test_single_pending_operation() {
        assert_eq!(run("1000+500=").value(), 1500.0);
        assert_eq!(run("10-4=").value(), 6.0);
        assert_eq!(run("12×3=").value(), 36.0);
        assert_eq!(run("9/2=").value(), 4.5);
    }

    #[test]
    fn test_later_operator_replaces_pending() {
        // Only one operation is tracked; the second operator restarts it.
        let calc = run("2+3*4=");
        assert_eq!(calc.value(), 12.0);
    }

    #[test]
    fn test_divide_by_zero_is_zero() {
        assert_eq!(run("5/0=").value(), 0.0);
    }

    #[test]
    fn test_percent_and_equals_without_pending() {
        assert_eq!(run("50%").value(), 0.5);
        assert_eq!(run("42=").value(), 42.0);
    }

    #[test]
    fn test_clear_and_delete() {
        assert_eq!(run("123<").display(), "12");
        assert_eq!(run("1<<").display(), "0");
        let calc = run("5+3C");
        assert_eq!(calc.display(), "0");
        assert!(calc.pending().is_none());
    }

    #[test]
    fn test_input_after_operator_starts_fresh() {
        let calc = run("7+");
        assert_eq!(calc.pending(), Some(Operation::Add));
        assert_eq!(calc.display(), "7");
        assert_eq!(run("7+.5=").value(), 7.5);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let mut calc = Calculator::new();
        let err = calc.feed("12a").unwrap_err();
        assert!(err.to_string().contains("Unsupported key"));
    }
}

//! Vehicle registration input.
//!
//! The stepper form splits a registration into three constrained boxes
//! (year digits, county letters, sequence digits); the calendar form takes
//! one free-text field.

pub const PART1_MAX: usize = 3;
pub const PART2_MAX: usize = 3;
pub const PART3_MAX: usize = 8;

/// Keeps ASCII digits, cut to `max` characters.
pub fn digits_only(raw: &str, max: usize) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).take(max).collect()
}

/// Keeps ASCII letters upper-cased, cut to `max` characters.
pub fn letters_upper(raw: &str, max: usize) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase())
        .take(max)
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationParts {
    part1: String,
    part2: String,
    part3: String,
}

impl RegistrationParts {
    pub fn set_part1(&mut self, raw: &str) {
        self.part1 = digits_only(raw, PART1_MAX);
    }

    pub fn set_part2(&mut self, raw: &str) {
        self.part2 = letters_upper(raw, PART2_MAX);
    }

    pub fn set_part3(&mut self, raw: &str) {
        self.part3 = digits_only(raw, PART3_MAX);
    }

    pub fn parts(&self) -> (&str, &str, &str) {
        (&self.part1, &self.part2, &self.part3)
    }

    /// Names of the empty boxes, in form order.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.part1.is_empty() {
            missing.push("registration (part 1)");
        }
        if self.part2.is_empty() {
            missing.push("registration (part 2)");
        }
        if self.part3.is_empty() {
            missing.push("registration (part 3)");
        }
        missing
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    Parts(RegistrationParts),
    FreeText(String),
}

impl Default for Registration {
    fn default() -> Self {
        Registration::Parts(RegistrationParts::default())
    }
}

impl Registration {
    pub fn free_text() -> Self {
        Registration::FreeText(String::new())
    }

    /// The string sent to the webhook: the parts concatenated, or the
    /// trimmed free text.
    pub fn composed(&self) -> String {
        match self {
            Registration::Parts(p) => format!("{}{}{}", p.part1, p.part2, p.part3),
            Registration::FreeText(text) => text.trim().to_string(),
        }
    }

    pub fn missing(&self) -> Vec<&'static str> {
        match self {
            Registration::Parts(p) => p.missing(),
            Registration::FreeText(text) if text.trim().is_empty() => vec!["registration"],
            Registration::FreeText(_) => Vec::new(),
        }
    }
}

//! Generic form state for the CRUD tabs.
//!
//! Every data-entry screen in the app is the same shape: a column of
//! labelled fields, a submit button, required/parse validation with the
//! error shown inline next to the offending field. This module carries
//! that shape once so each tab only declares its fields.

use chrono::NaiveDate;

/// Maximum length for free-text fields
const MAX_TEXT_LENGTH: usize = 64;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length for numeric input
const MAX_NUMBER_LENGTH: usize = 12;

/// What a field accepts and how it is edited.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text,
    Number,
    /// Calendar date, entered as YYYY-MM-DD
    Date,
    Password,
    /// One of a fixed set of options, cycled with Left/Right
    Select(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct Field {
    pub label: &'static str,
    pub kind: FieldKind,
    pub value: String,
    pub required: bool,
    pub error: Option<String>,
}

impl Field {
    pub fn text(label: &'static str, required: bool) -> Self {
        Self::new(label, FieldKind::Text, required)
    }

    pub fn number(label: &'static str, required: bool) -> Self {
        Self::new(label, FieldKind::Number, required)
    }

    pub fn date(label: &'static str, required: bool) -> Self {
        Self::new(label, FieldKind::Date, required)
    }

    pub fn password(label: &'static str, required: bool) -> Self {
        Self::new(label, FieldKind::Password, required)
    }

    pub fn select(label: &'static str, options: Vec<String>) -> Self {
        let value = options.first().cloned().unwrap_or_default();
        Self {
            label,
            kind: FieldKind::Select(options),
            value,
            required: true,
            error: None,
        }
    }

    fn new(label: &'static str, kind: FieldKind, required: bool) -> Self {
        Self {
            label,
            kind,
            value: String::new(),
            required,
            error: None,
        }
    }

    fn max_len(&self) -> usize {
        match self.kind {
            FieldKind::Password => MAX_PASSWORD_LENGTH,
            FieldKind::Number => MAX_NUMBER_LENGTH,
            FieldKind::Date => 10,
            _ => MAX_TEXT_LENGTH,
        }
    }

    /// Whether a character makes sense for this field at all. Anything
    /// else is dropped at the keyboard rather than failing validation.
    fn accepts(&self, c: char) -> bool {
        match self.kind {
            FieldKind::Number => c.is_ascii_digit() || c == '.',
            FieldKind::Date => c.is_ascii_digit() || c == '-',
            FieldKind::Select(_) => false,
            _ => !c.is_control(),
        }
    }

    pub fn insert(&mut self, c: char) {
        if self.value.len() < self.max_len() && self.accepts(c) {
            self.value.push(c);
            self.error = None;
        }
    }

    pub fn backspace(&mut self) {
        if !matches!(self.kind, FieldKind::Select(_)) {
            self.value.pop();
            self.error = None;
        }
    }

    /// Step a select field through its options; no-op for other kinds.
    pub fn cycle(&mut self, step: isize) {
        if let FieldKind::Select(ref options) = self.kind {
            if options.is_empty() {
                return;
            }
            let len = options.len() as isize;
            let current = options
                .iter()
                .position(|o| *o == self.value)
                .unwrap_or(0) as isize;
            let next = (current + step).rem_euclid(len) as usize;
            self.value = options[next].clone();
        }
    }

    /// Validate the current value, recording the error inline.
    pub fn validate(&mut self) -> bool {
        self.error = None;
        let value = self.value.trim();

        if value.is_empty() {
            if self.required {
                self.error = Some(format!("{} is required", self.label));
                return false;
            }
            return true;
        }

        match self.kind {
            FieldKind::Number => match value.parse::<f64>() {
                Ok(n) if n >= 0.0 => true,
                Ok(_) => {
                    self.error = Some(format!("{} cannot be negative", self.label));
                    false
                }
                Err(_) => {
                    self.error = Some(format!("{} must be a number", self.label));
                    false
                }
            },
            FieldKind::Date => {
                if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok() {
                    true
                } else {
                    self.error = Some(format!("{} must be YYYY-MM-DD", self.label));
                    false
                }
            }
            _ => true,
        }
    }
}

/// A column of fields plus a submit button. `focus == fields.len()`
/// means the button is focused.
#[derive(Debug, Clone)]
pub struct Form {
    pub fields: Vec<Field>,
    pub focus: usize,
}

impl Form {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields, focus: 0 }
    }

    pub fn on_button(&self) -> bool {
        self.focus == self.fields.len()
    }

    pub fn focused_field(&mut self) -> Option<&mut Field> {
        let focus = self.focus;
        self.fields.get_mut(focus)
    }

    pub fn next(&mut self) {
        self.focus = (self.focus + 1) % (self.fields.len() + 1);
    }

    pub fn prev(&mut self) {
        self.focus = self
            .focus
            .checked_sub(1)
            .unwrap_or(self.fields.len());
    }

    /// Validate every field; all errors render at once.
    pub fn validate(&mut self) -> bool {
        let mut ok = true;
        for field in &mut self.fields {
            if !field.validate() {
                ok = false;
            }
        }
        ok
    }

    pub fn reset(&mut self) {
        for field in &mut self.fields {
            if let FieldKind::Select(ref options) = field.kind {
                field.value = options.first().cloned().unwrap_or_default();
            } else {
                field.value.clear();
            }
            field.error = None;
        }
        self.focus = 0;
    }

    pub fn value(&self, label: &str) -> &str {
        self.fields
            .iter()
            .find(|f| f.label == label)
            .map(|f| f.value.trim())
            .unwrap_or("")
    }

    pub fn set_value(&mut self, label: &str, value: impl Into<String>) {
        if let Some(field) = self.fields.iter_mut().find(|f| f.label == label) {
            field.value = value.into();
        }
    }

    /// Parsed numeric value; 0.0 for anything unparseable (validation
    /// runs before submission, so this is only reached on valid input).
    pub fn number(&self, label: &str) -> f64 {
        self.value(label).parse().unwrap_or(0.0)
    }

    pub fn parsed_date(&self, label: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.value(label), "%Y-%m-%d").ok()
    }

    pub fn optional(&self, label: &str) -> Option<String> {
        let value = self.value(label);
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }

    /// Replace the option list of a select field, keeping the current
    /// choice when it is still available.
    pub fn set_options(&mut self, label: &str, options: Vec<String>) {
        if let Some(field) = self.fields.iter_mut().find(|f| f.label == label) {
            let keep = options.contains(&field.value);
            if !keep {
                field.value = options.first().cloned().unwrap_or_default();
            }
            field.kind = FieldKind::Select(options);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_form() -> Form {
        Form::new(vec![
            Field::date("Date", true),
            Field::text("Vehicle", true),
            Field::number("Weight (kg)", true),
            Field::text("Notes", false),
        ])
    }

    #[test]
    fn required_fields_error_inline() {
        let mut form = sample_form();
        assert!(!form.validate());
        assert_eq!(form.fields[0].error.as_deref(), Some("Date is required"));
        assert_eq!(form.fields[3].error, None); // optional field stays clean
    }

    #[test]
    fn number_field_rejects_garbage_at_validation() {
        let mut form = sample_form();
        form.set_value("Date", "2026-02-03");
        form.set_value("Vehicle", "KL-07-AX-1221");
        form.set_value("Weight (kg)", "12.5.3");
        assert!(!form.validate());
        assert!(form.fields[2].error.as_deref().unwrap().contains("number"));
    }

    #[test]
    fn date_field_wants_iso_format() {
        let mut field = Field::date("Date", true);
        field.value = "03/02/2026".into();
        assert!(!field.validate());
        field.value = "2026-02-03".into();
        assert!(field.validate());
    }

    #[test]
    fn keyboard_filtering_per_kind() {
        let mut weight = Field::number("Weight (kg)", true);
        weight.insert('1');
        weight.insert('x');
        weight.insert('.');
        weight.insert('5');
        assert_eq!(weight.value, "1.5");
    }

    #[test]
    fn focus_wraps_through_button() {
        let mut form = sample_form();
        for _ in 0..form.fields.len() {
            form.next();
        }
        assert!(form.on_button());
        form.next();
        assert_eq!(form.focus, 0);
        form.prev();
        assert!(form.on_button());
    }

    #[test]
    fn select_cycles_and_survives_option_refresh() {
        let mut form = Form::new(vec![Field::select(
            "Category",
            vec!["PET".into(), "HDPE".into()],
        )]);
        assert_eq!(form.value("Category"), "PET");
        form.fields[0].cycle(1);
        assert_eq!(form.value("Category"), "HDPE");
        form.fields[0].cycle(1);
        assert_eq!(form.value("Category"), "PET");

        form.set_options("Category", vec!["PET".into(), "Cardboard".into(), "Glass".into()]);
        assert_eq!(form.value("Category"), "PET"); // still available, kept
        form.set_options("Category", vec!["Metal".into()]);
        assert_eq!(form.value("Category"), "Metal"); // gone, first option adopted
    }

    #[test]
    fn reset_clears_values_and_errors() {
        let mut form = sample_form();
        form.set_value("Vehicle", "KL-07-AX-1221");
        form.validate();
        form.reset();
        assert_eq!(form.value("Vehicle"), "");
        assert!(form.fields.iter().all(|f| f.error.is_none()));
        assert_eq!(form.focus, 0);
    }
}

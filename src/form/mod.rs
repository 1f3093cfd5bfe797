//! Registration form model
//!
//! Holds the field catalogue, the live input values and the course module
//! options. The module selection is stored as the `course_module` entry of
//! the input set, so there is only one place it lives.

pub mod payload;
pub mod rules;

use serde::Deserialize;

/// Every control on the registration form, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    Email,
    Password,
    ConfirmPassword,
    Bio,
    Contact,
    CourseModule,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Name,
        Field::Email,
        Field::Password,
        Field::ConfirmPassword,
        Field::Bio,
        Field::Contact,
        Field::CourseModule,
    ];

    /// Key used for this field in payloads and error maps
    pub fn key(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Password => "password",
            Field::ConfirmPassword => "confirmPassword",
            Field::Bio => "bio",
            Field::Contact => "contact",
            Field::CourseModule => "course_module",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Email => "Email",
            Field::Password => "Password",
            Field::ConfirmPassword => "Confirm password",
            Field::Bio => "Bio",
            Field::Contact => "Contact",
            Field::CourseModule => "Select module",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            Field::Name => "Your full name",
            Field::Email => "Your email",
            Field::Password => "Your password",
            Field::ConfirmPassword => "Confirm your password",
            Field::Bio => "Tell us a little about yourself",
            Field::Contact => "Your phone number or your Linkedin url",
            Field::CourseModule => "",
        }
    }

    /// Password inputs are rendered masked
    pub fn is_secret(self) -> bool {
        matches!(self, Field::Password | Field::ConfirmPassword)
    }

    /// The module field is a selector, every other field takes typed text
    pub fn is_text(self) -> bool {
        self != Field::CourseModule
    }
}

/// One of the four fixed course modules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CourseModule {
    #[default]
    First,
    Second,
    Third,
    Fourth,
}

impl CourseModule {
    pub const ALL: [CourseModule; 4] = [
        CourseModule::First,
        CourseModule::Second,
        CourseModule::Third,
        CourseModule::Fourth,
    ];

    /// Value sent to the server
    pub fn value(self) -> &'static str {
        match self {
            CourseModule::First => "First module (Introduction to Frontend)",
            CourseModule::Second => "Second module (Advanced front-end)",
            CourseModule::Third => "Third module (Introduction to Backend)",
            CourseModule::Fourth => "Fourth module (Advanced Backend)",
        }
    }

    /// Short label shown in the selector
    pub fn label(self) -> &'static str {
        match self {
            CourseModule::First => "First module",
            CourseModule::Second => "Second module",
            CourseModule::Third => "Third module",
            CourseModule::Fourth => "Fourth module",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.value() == value)
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[idx.checked_sub(1).unwrap_or(Self::ALL.len() - 1)]
    }
}

/// The live values of every registration field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub bio: String,
    pub contact: String,
    /// `None` once the controls have been cleared after a submit
    pub course_module: Option<CourseModule>,
}

impl Default for FormInput {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            password: String::new(),
            confirm_password: String::new(),
            bio: String::new(),
            contact: String::new(),
            course_module: Some(CourseModule::default()),
        }
    }
}

impl FormInput {
    /// Current value of a field as the string the form shows
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Password => &self.password,
            Field::ConfirmPassword => &self.confirm_password,
            Field::Bio => &self.bio,
            Field::Contact => &self.contact,
            Field::CourseModule => self.course_module.map(CourseModule::value).unwrap_or(""),
        }
    }

    /// Replace a field's value. For the module field the value must be one of
    /// the option values; anything else leaves it unselected.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Name => self.name = value,
            Field::Email => self.email = value,
            Field::Password => self.password = value,
            Field::ConfirmPassword => self.confirm_password = value,
            Field::Bio => self.bio = value,
            Field::Contact => self.contact = value,
            Field::CourseModule => self.course_module = CourseModule::from_value(&value),
        }
    }

    /// Mutable text buffer for a typed field
    pub fn text_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::Name => Some(&mut self.name),
            Field::Email => Some(&mut self.email),
            Field::Password => Some(&mut self.password),
            Field::ConfirmPassword => Some(&mut self.confirm_password),
            Field::Bio => Some(&mut self.bio),
            Field::Contact => Some(&mut self.contact),
            Field::CourseModule => None,
        }
    }

    pub fn select_module(&mut self, module: CourseModule) {
        self.course_module = Some(module);
    }

    /// Empty every control, including the module selector
    pub fn clear(&mut self) {
        for field in Field::ALL {
            self.set(field, "");
        }
    }
}

/// Form values as read from a file for headless submission
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormFile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, alias = "confirmPassword")]
    pub confirm_password: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub contact: String,
    /// Option value or short label; missing means the first module
    #[serde(default)]
    pub course_module: Option<String>,
}

impl From<FormFile> for FormInput {
    fn from(file: FormFile) -> Self {
        let course_module = match file.course_module {
            None => Some(CourseModule::default()),
            Some(v) => CourseModule::ALL
                .into_iter()
                .find(|m| m.value() == v || m.label().eq_ignore_ascii_case(&v)),
        };

        Self {
            name: file.name,
            email: file.email,
            password: file.password,
            confirm_password: file.confirm_password,
            bio: file.bio,
            contact: file.contact,
            course_module,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_form_is_empty_with_first_module() {
        let input = FormInput::default();
        for field in Field::ALL.into_iter().filter(|f| f.is_text()) {
            assert_eq!(input.get(field), "");
        }
        assert_eq!(input.get(Field::CourseModule), "First module (Introduction to Frontend)");
    }

    #[test]
    fn test_module_selection_is_the_field_value() {
        let mut input = FormInput::default();
        input.select_module(CourseModule::Third);
        assert_eq!(input.get(Field::CourseModule), CourseModule::Third.value());

        input.set(Field::CourseModule, CourseModule::Second.value());
        assert_eq!(input.course_module, Some(CourseModule::Second));

        input.set(Field::CourseModule, "not a module");
        assert_eq!(input.course_module, None);
    }

    #[test]
    fn test_module_cycling_wraps() {
        assert_eq!(CourseModule::Fourth.next(), CourseModule::First);
        assert_eq!(CourseModule::First.prev(), CourseModule::Fourth);
        assert_eq!(CourseModule::Second.next(), CourseModule::Third);
    }

    #[test]
    fn test_clear_empties_every_control() {
        let mut input = FormInput::default();
        input.set(Field::Name, "Ada");
        input.set(Field::Password, "secret1");
        input.clear();
        for field in Field::ALL {
            assert_eq!(input.get(field), "", "{} not cleared", field.key());
        }
    }

    #[test]
    fn test_form_file_accepts_module_label() {
        let file: FormFile = toml::from_str(
            r#"
            name = "Ada"
            confirmPassword = "abcdef"
            course_module = "fourth module"
            "#,
        )
        .unwrap();
        let input = FormInput::from(file);
        assert_eq!(input.confirm_password, "abcdef");
        assert_eq!(input.course_module, Some(CourseModule::Fourth));
    }
}

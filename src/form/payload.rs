use serde::Serialize;

use super::FormInput;

/// Body of `POST /users`: the form values without the password confirmation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationPayload {
    pub name: String,
    pub email: String,
    pub password: String,
    pub bio: String,
    pub contact: String,
    pub course_module: String,
}

impl From<&FormInput> for RegistrationPayload {
    fn from(input: &FormInput) -> Self {
        Self {
            name: input.name.clone(),
            email: input.email.clone(),
            password: input.password.clone(),
            bio: input.bio.clone(),
            contact: input.contact.clone(),
            course_module: input.get(super::Field::CourseModule).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::CourseModule;

    #[test]
    fn test_payload_drops_confirmation() {
        let input = FormInput {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "abcdef".to_string(),
            confirm_password: "abcdef".to_string(),
            bio: "Engines".to_string(),
            contact: "ada.example".to_string(),
            course_module: Some(CourseModule::Fourth),
        };

        let json = serde_json::to_value(RegistrationPayload::from(&input)).unwrap();
        let obj = json.as_object().unwrap();

        let mut keys: Vec<&str> = obj.keys().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["bio", "contact", "course_module", "email", "name", "password"]);
        assert!(!obj.contains_key("confirmPassword"));
        assert_eq!(obj["course_module"], "Fourth module (Advanced Backend)");
        assert_eq!(obj["password"], "abcdef");
    }
}

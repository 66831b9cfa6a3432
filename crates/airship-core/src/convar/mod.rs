//! Console variables.
//!
//! A convar is a named value of one of four types, shared between the
//! registry and every handle obtained from it.

mod error;
mod registry;
mod value;

pub use error::ConvarError;
pub use registry::ConvarRegistry;
pub use value::{Convar, ConvarType, ConvarValue, IntoConvar};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_read_each_type() {
        let mut reg = ConvarRegistry::new();
        reg.register_key("name", "airship");
        reg.register_key("gravity", 9.8f32);
        reg.register_key("lives", 3);
        reg.register_key("vsync", true);

        assert_eq!(reg.size(), 4);
        assert_eq!(reg.type_of("name"), Some(ConvarType::String));
        assert_eq!(reg.type_of("gravity"), Some(ConvarType::Float));
        assert_eq!(reg.type_of("lives"), Some(ConvarType::Int));
        assert_eq!(reg.type_of("vsync"), Some(ConvarType::Bool));

        assert_eq!(reg.read::<String>("name").map(|c| c.get()), Some("airship".to_owned()));
        assert_eq!(reg.read::<i32>("lives").map(|c| c.get()), Some(3));
        assert!(reg.read::<bool>("vsync").is_some_and(|c| c == true));
    }

    #[test]
    fn read_missing_or_wrong_type_is_none() {
        let mut reg = ConvarRegistry::new();
        reg.register_key("lives", 3);
        assert!(reg.read::<i32>("missing").is_none());
        assert!(reg.read::<f32>("lives").is_none());
        assert!(!reg.contains("missing"));
        assert_eq!(reg.type_of("missing"), None);
    }

    #[test]
    fn reregistering_keeps_existing_value() {
        let mut reg = ConvarRegistry::new();
        let first = reg.register_key("lives", 3).unwrap();
        let again = reg.register_key("lives", 9).unwrap();
        assert!(first.same_as(&again));
        assert_eq!(again.get(), 3);
        assert_eq!(reg.size(), 1);

        assert!(reg.register_key("lives", "nine").is_none());
        assert_eq!(reg.type_of("lives"), Some(ConvarType::Int));
    }

    #[test]
    fn handles_share_storage() {
        let mut reg = ConvarRegistry::new();
        let a = reg.register_key("speed", 1.5f32).unwrap();
        let b = reg.read::<f32>("speed").unwrap();

        a.set(4.0);
        assert_eq!(b.get(), 4.0);

        b.update(|v| *v *= 2.0);
        assert!(a == 8.0);
        assert!(a > 7.0);
        assert!(a < 9.0);
        assert_eq!(reg.value_text("speed").as_deref(), Some("8"));
    }

    #[test]
    fn set_from_str_parses_by_type() {
        let mut reg = ConvarRegistry::new();
        let vsync = reg.register_key("vsync", false).unwrap();
        let width = reg.register_key("width", 800).unwrap();

        reg.set_from_str("vsync", "on").unwrap();
        reg.set_from_str("width", " 1024 ").unwrap();
        assert!(vsync == true);
        assert_eq!(width.get(), 1024);

        assert_eq!(
            reg.set_from_str("width", "wide"),
            Err(ConvarError::InvalidValue {
                name: "width".into(),
                expected: ConvarType::Int,
                value: "wide".into(),
            })
        );
        assert_eq!(
            reg.set_from_str("height", "1"),
            Err(ConvarError::UnknownKey("height".into()))
        );
        assert_eq!(width.get(), 1024);
    }

    #[test]
    fn overrides_apply_and_collect_errors() {
        let mut reg = ConvarRegistry::new();
        let title = reg.register_key("title", "untitled").unwrap();
        let dt = reg.register_key("max_frame_dt", 0.1f32).unwrap();

        let errors = reg.apply_overrides(["title=Snake", "max_frame_dt = 0.05", "bogus", "nope=1"]);

        assert_eq!(title.get(), "Snake");
        assert_eq!(dt.get(), 0.05);
        assert_eq!(
            errors,
            vec![
                ConvarError::MalformedOverride("bogus".into()),
                ConvarError::UnknownKey("nope".into()),
            ]
        );
    }

    #[test]
    fn entries_are_sorted() {
        let mut reg = ConvarRegistry::new();
        reg.register_key("b", 2);
        reg.register_key("a", 1);
        let names: Vec<_> = reg.entries().map(|(n, _, _)| n.to_owned()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}

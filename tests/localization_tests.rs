//! # Localization Tests
//!
//! Message retrieval and formatting for the Russian resource bundle.

use vk_photo_bot::localization::LocalizationManager;
use std::collections::HashMap;

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_localization() -> LocalizationManager {
        // Create a new localization manager for each test
        LocalizationManager::new().expect("Failed to create localization manager")
    }

    #[test]
    fn test_get_message_existing_key() {
        let manager = setup_localization();

        assert_eq!(manager.get_message("navigation-prompt", None), "Что дальше?");
        assert_eq!(manager.get_message("avatar-missing", None), "У вас нет аватара");
        assert_eq!(
            manager.get_message("photos-request", None),
            "Пришлите фотографии в своём следующем сообщении."
        );
    }

    #[test]
    fn test_get_message_nonexistent_key() {
        let manager = setup_localization();

        let message = manager.get_message("nonexistent-key", None);
        assert_eq!(message, "Missing translation: nonexistent-key");
    }

    #[test]
    fn test_get_message_with_args() {
        let manager = setup_localization();

        let mut args = HashMap::new();
        args.insert("name", "Мария");

        let message = manager.get_message("greeting", Some(&args));
        // No Unicode isolation marks around the placeable
        assert_eq!(message, "Привет, Мария. Держи меню!");
    }

    #[test]
    fn test_time_message() {
        let manager = setup_localization();

        let message = manager.get_message_with_args("time-now", &[("time", "03:00:00")]);
        assert_eq!(message, "Сейчас 03:00:00 по Москве");
    }

    #[test]
    fn test_get_message_missing_args() {
        let manager = setup_localization();

        // Missing arguments are reported by fluent but still produce text
        let message = manager.get_message("greeting", None);
        assert!(message.starts_with("Привет, "));
    }

    #[test]
    fn test_convenience_functions() {
        vk_photo_bot::localization::init_localization().expect("Failed to initialize localization");

        assert_eq!(vk_photo_bot::localization::t("button-back"), "Вернуться");
        let message = vk_photo_bot::localization::t_args("greeting", &[("name", "Олег")]);
        assert_eq!(message, "Привет, Олег. Держи меню!");
    }
}

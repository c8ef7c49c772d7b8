mod chrome;
mod color;
mod geometry;

pub use chrome::*;
pub use color::*;
pub use geometry::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_center() {
        let r = Rect::new(100, 50, 800, 600);
        assert_eq!(r.center(), Point::new(500, 350));
    }

    #[test]
    fn rect_centered_inside() {
        let screen = Rect::new(0, 0, 1920, 1080);
        let r = screen.centered(640, 480);
        assert_eq!(r, Rect::new(640, 300, 640, 480));
    }

    #[test]
    fn rect_distance_is_zero_inside() {
        let r = Rect::new(0, 0, 100, 100);
        assert_eq!(r.distance_sq(Point::new(50, 50)), 0);
        assert_eq!(r.distance_sq(Point::new(103, 104)), 9 + 16);
        assert!(r.contains(Point::new(0, 0)));
        assert!(!r.contains(Point::new(100, 0)));
    }

    #[test]
    fn rect_serialization() {
        let r = Rect::new(0, 0, 1920, 1080);
        let json = serde_json::to_string(&r).unwrap();
        let deserialized: Rect = serde_json::from_str(&json).unwrap();
        assert_eq!(r, deserialized);
    }

    #[test]
    fn color_from_hex_6() {
        let c = Color::from_hex("#ff8800").unwrap();
        assert_eq!(c, Color::from_rgba(255, 136, 0, 255));
    }

    #[test]
    fn color_from_hex_8() {
        let c = Color::from_hex("#ff880080").unwrap();
        assert_eq!(c, Color::from_rgba(255, 136, 0, 128));
    }

    #[test]
    fn color_from_hex_invalid() {
        assert!(Color::from_hex("zzzzzz").is_none());
        assert!(Color::from_hex("#abc").is_none());
        assert!(Color::from_hex("").is_none());
        assert!(Color::from_hex("#ééé").is_none());
    }

    #[test]
    fn color_to_hex_roundtrip() {
        let original = Color::from_rgba(171, 205, 239, 255);
        assert_eq!(original.to_hex(), "#abcdef");
        assert_eq!(Color::from_hex(&original.to_hex()), Some(original));
    }

    #[test]
    fn chrome_mode_parse_and_display() {
        assert_eq!("native".parse::<ChromeMode>(), Ok(ChromeMode::Native));
        assert_eq!(" Custom ".parse::<ChromeMode>(), Ok(ChromeMode::Custom));
        assert!("hidden".parse::<ChromeMode>().is_err());
        assert_eq!(ChromeMode::Custom.to_string(), "custom");
    }

    #[test]
    fn app_state_serializes_lowercase() {
        let json = serde_json::to_string(&AppState::Running).unwrap();
        assert_eq!(json, "\"running\"");
    }
}

use std::io::Write;
use std::time::Duration;

use slide_gallery::config::Configuration;
use slide_gallery::error::GalleryError;
use slide_gallery::surface::{Slide, SlideContent};

#[test]
fn parse_kebab_case_config() {
    let yaml = r#"
galleries:
  - display-id: hero
    thumbs-id: hero-thumbs
    gallery-controls-id: hero-controls
    thumbs-controls-id: hero-thumb-controls
    set-size: 3
    auto-rotate: 3000
    clear-auto-rotate-on-interact: true
    slide-transition: 250ms
    thumbs-transition: 1s
    markup:
      display-width: 640
      thumb-width: 90
      slides:
        - img-src: images/one.jpg
        - dom-id: promo-card
        - {}
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let cfg = cfg.validated().unwrap();
    let hero = &cfg.galleries[0];

    assert_eq!(hero.display_id, "hero");
    assert_eq!(hero.gallery_controls_id.as_deref(), Some("hero-controls"));
    assert_eq!(hero.thumbs_controls_id.as_deref(), Some("hero-thumb-controls"));
    assert_eq!(hero.initial_set_size(), 3);
    assert_eq!(hero.auto_rotate_interval(), Duration::from_secs(3));
    assert!(hero.clear_auto_rotate_on_interact);
    assert_eq!(hero.slide_transition, Duration::from_millis(250));
    assert_eq!(hero.thumbs_transition, Duration::from_secs(1));
    assert!((hero.markup.display_width - 640.0).abs() < f64::EPSILON);
    assert!((hero.markup.thumb_width - 90.0).abs() < f64::EPSILON);

    let contents: Vec<SlideContent> = hero.markup.slides.iter().map(Slide::content).collect();
    assert_eq!(
        contents,
        vec![
            SlideContent::Image("images/one.jpg".into()),
            SlideContent::Fragment("promo-card".into()),
            SlideContent::Empty,
        ]
    );
}

#[test]
fn missing_thumbs_id_fails_validation() {
    let yaml = r#"
galleries:
  - display-id: hero
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let err = cfg.validated().unwrap_err();
    assert!(format!("{err:#}").contains("missing thumbs-id"));
}

#[test]
fn missing_display_id_fails_validation() {
    let yaml = r#"
galleries:
  - thumbs-id: hero-thumbs
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let err = cfg.validated().unwrap_err();
    assert!(format!("{err:#}").contains("missing display-id"));
}

#[test]
fn duplicate_display_ids_are_rejected() {
    let yaml = r#"
galleries:
  - display-id: hero
    thumbs-id: a
  - display-id: hero
    thumbs-id: b
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    assert!(cfg.validated().is_err());
}

#[test]
fn empty_configuration_is_rejected() {
    let cfg: Configuration = serde_yaml::from_str("galleries: []").unwrap();
    assert!(cfg.validated().is_err());
}

#[test]
fn unknown_keys_are_rejected() {
    let yaml = r#"
galleries:
  - display-id: hero
    thumbs-id: hero-thumbs
    autorotate: 10
"#;
    assert!(serde_yaml::from_str::<Configuration>(yaml).is_err());
}

#[test]
fn load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "galleries:\n  - display-id: hero\n    thumbs-id: hero-thumbs\n    set-size: -3"
    )
    .unwrap();

    let cfg = Configuration::from_yaml_file(file.path())
        .unwrap()
        .validated()
        .unwrap();
    assert_eq!(cfg.galleries.len(), 1);
    assert_eq!(cfg.galleries[0].initial_set_size(), 5);
}

#[test]
fn load_errors_keep_their_kind() {
    let dir = tempfile::tempdir().unwrap();
    let missing = Configuration::from_yaml_file(dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(missing, GalleryError::Io(_)));

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "galleries: [unclosed").unwrap();
    let malformed = Configuration::from_yaml_file(file.path()).unwrap_err();
    assert!(matches!(malformed, GalleryError::Config(_)));
}

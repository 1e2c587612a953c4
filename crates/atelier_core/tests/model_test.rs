use atelier_core::{
    Approval, AspectRatio, Creative, Idea, ImageSettings, LlmProvider, Platform,
    PlatformCredentials, ProviderSettings, Region,
};
use std::collections::BTreeMap;

fn approved_creative() -> Creative {
    serde_json::from_value(serde_json::json!({
        "id": "c-1",
        "idea_id": "i-1",
        "aspect_ratio": "9:16",
        "generation_count": 2,
        "region": "DE",
        "demographic": "Gen Z",
        "brand": "Acme",
        "file_path": "uploads/creatives/c-1.png",
        "created_at": "2024-05-01T10:00:00.000001",
        "approval": {
            "creative_approved": true,
            "regional_approved": true,
            "deployed": true,
            "deployed_at": "2024-05-02T10:00:00+00:00"
        }
    }))
    .expect("valid creative")
}

#[test]
fn test_regenerated_creative_starts_as_draft() {
    let old = approved_creative();
    let fresh: Creative = serde_json::from_value(serde_json::json!({
        "id": "c-1",
        "idea_id": "i-1",
        "aspect_ratio": "9:16",
        "generation_count": 3,
        "file_path": "uploads/creatives/c-1-v2.png"
    }))
    .unwrap();

    let replaced = old.replaced_by(fresh);

    assert_eq!(replaced.approval, Approval::draft());
    assert_eq!(replaced.file_path, "uploads/creatives/c-1-v2.png");
    assert_eq!(replaced.region, Some(Region::new("DE")));
    assert_eq!(replaced.brand.as_deref(), Some("Acme"));
    assert_eq!(replaced.generation(), 3);
}

#[test]
fn test_regenerate_discards_approval_even_if_backend_echoes_it() {
    let old = approved_creative();
    let echoed = old.clone();
    assert_eq!(old.replaced_by(echoed).approval, Approval::draft());
}

#[test]
fn test_creative_inherits_idea_labels() {
    let idea: Idea = serde_json::from_value(serde_json::json!({
        "id": 7, "region": "DE", "demographic": "Gen Z", "content": "x", "generation_count": 4
    }))
    .unwrap();
    let bare: Creative = serde_json::from_value(serde_json::json!({
        "id": 1, "aspect_ratio": "1:1"
    }))
    .unwrap();

    let filled = bare.inherit_from(&idea);

    assert_eq!(filled.idea_id, Some(idea.id.clone()));
    assert_eq!(filled.generation(), 4);
    assert_eq!(filled.region, Some(Region::new("DE")));
    assert_eq!(filled.aspect_ratio, AspectRatio::Square);
}

#[test]
fn test_asset_url_joins_cleanly() {
    let creative = approved_creative();
    assert_eq!(
        creative.asset_url("http://localhost:8002/"),
        "http://localhost:8002/uploads/creatives/c-1.png"
    );
}

#[test]
fn test_failed_placeholder_is_not_actionable() {
    let failed = Idea::placeholder("BR", "Parents").into_failed("LLM timeout");
    assert!(failed.has_error);
    assert!(!failed.is_pending());
    assert!(!failed.is_actionable());
}

#[test]
fn test_unknown_aspect_ratio_is_rejected() {
    let result: Result<Creative, _> =
        serde_json::from_value(serde_json::json!({"id": 1, "aspect_ratio": "4:3"}));
    assert!(result.is_err());
}

#[test]
fn test_settings_roundtrip_through_flat_map() {
    let mut platforms = BTreeMap::new();
    platforms.insert(
        Platform::Instagram,
        PlatformCredentials {
            username: "acme".into(),
            password: "hunter2".into(),
        },
    );
    let settings = ProviderSettings {
        llm: atelier_core::LlmSettings {
            provider: LlmProvider::Gemini,
            api_key: Some("g-key".into()),
        },
        image: ImageSettings::AdobeFirefly {
            client_id: "cid".into(),
            client_secret: "secret".into(),
            access_token: "jwt".into(),
            org_id: "org".into(),
            api_key: None,
        },
        platforms,
    };

    let flat = settings.to_flat();
    assert_eq!(flat.get("use_llm").map(String::as_str), Some("Gemini"));
    assert_eq!(flat.get("Gemini").map(String::as_str), Some("g-key"));
    assert_eq!(flat.get("adobe_jwt").map(String::as_str), Some("jwt"));
    assert_eq!(flat.get("instagram_password").map(String::as_str), Some("hunter2"));

    assert_eq!(ProviderSettings::from_flat(&flat).unwrap(), settings);
}

#[test]
fn test_settings_defaults_and_unknown_provider() {
    let empty = BTreeMap::new();
    let settings = ProviderSettings::from_flat(&empty).unwrap();
    assert_eq!(settings.llm.provider, LlmProvider::OpenAi);
    assert!(matches!(settings.image, ImageSettings::AdobeFirefly { .. }));

    let mut bad = BTreeMap::new();
    bad.insert("llm_provider".to_string(), "Clippy".to_string());
    assert!(ProviderSettings::from_flat(&bad).is_err());
}

#[test]
fn test_redacted_hides_secrets() {
    let mut flat = BTreeMap::new();
    flat.insert("use_llm".to_string(), "OpenAI".to_string());
    flat.insert("OpenAI".to_string(), "sk-live".to_string());
    flat.insert("signal_username".to_string(), "ops".to_string());
    flat.insert("signal_password".to_string(), "pw".to_string());

    let redacted = ProviderSettings::from_flat(&flat).unwrap().redacted();

    assert_eq!(redacted.llm.api_key.as_deref(), Some("********"));
    assert_eq!(redacted.platforms[&Platform::Signal].username, "ops");
    assert_eq!(redacted.platforms[&Platform::Signal].password, "********");
}

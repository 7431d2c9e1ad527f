use codesage_lib::config::settings::{parse_config, AppConfig};
use codesage_lib::models::availability::tag_matches;
use codesage_lib::pipelines::router::{model_for_task, TaskType};

#[test]
fn test_every_task_routes_to_a_model() {
    let config = AppConfig::default();
    for task in TaskType::ALL {
        let decision = model_for_task(&config.models, task);
        assert!(!decision.selected.is_empty());
        assert_eq!(decision.task, task);
    }
}

#[test]
fn test_configured_models_are_routed() {
    let config = parse_config(
        r#"
        [models]
        hint_model = "mistral:7b"
        summary_model = "phi3:mini"
        fallback_model = "mistral:7b"
        "#,
    )
    .unwrap();

    let hint = model_for_task(&config.models, TaskType::Hint);
    assert_eq!(hint.selected, "mistral:7b");
    assert_eq!(hint.fallback, None);

    let summary = model_for_task(&config.models, TaskType::Summary);
    assert_eq!(summary.selected, "phi3:mini");
    assert_eq!(summary.fallback.as_deref(), Some("mistral:7b"));
}

#[test]
fn test_only_hints_bypass_the_cache() {
    let uncached: Vec<_> = TaskType::ALL.iter().filter(|t| !t.cacheable()).collect();
    assert_eq!(uncached, vec![&TaskType::Hint]);
}

#[test]
fn test_model_tags_match_installed_names() {
    assert!(tag_matches("qwen2.5-coder:7b", "qwen2.5-coder:7b"));
    assert!(tag_matches("llama3.1:latest", "llama3.1"));
    assert!(!tag_matches("llama3.1:8b", "llama3.2"));
}

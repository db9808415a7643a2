use std::sync::Once;

use deskhand_core::{update, AppState, Effect, Msg, TemplateSummary, NO_TEMPLATES};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(client_logging::initialize_for_tests);
}

fn template(id: &str, is_default: bool) -> TemplateSummary {
    TemplateSummary {
        id: id.to_string(),
        name: format!("Template {id}"),
        description: String::new(),
        is_default,
    }
}

#[test]
fn empty_template_list_renders_the_placeholder() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::TemplatesLoaded(Ok(Vec::new())));
    let view = state.view();
    assert!(view.templates.is_empty());
    assert_eq!(view.templates_placeholder, Some(NO_TEMPLATES));
}

#[test]
fn default_template_is_preselected_for_uploads() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::TemplatesLoaded(Ok(vec![template("standard", false), template("weekly", true)])),
    );
    assert_eq!(state.view().upload.template_id, Some("weekly".to_string()));

    // An explicit user choice is not overridden by a later reload.
    let (state, _) = update(state, Msg::TemplateSelected("standard".into()));
    let (state, _) = update(
        state,
        Msg::TemplatesLoaded(Ok(vec![template("standard", false), template("weekly", true)])),
    );
    assert_eq!(state.view().upload.template_id, Some("standard".to_string()));
}

#[test]
fn create_requires_id_name_and_prompt() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::CreateTemplateSubmitted {
            id: "retro".into(),
            name: "  ".into(),
            description: String::new(),
            prompt: "Summarize the retro".into(),
        },
    );
    assert!(effects.is_empty());
    assert!(state.view().templates_error.unwrap().contains("required"));

    let (_, effects) = update(
        state,
        Msg::CreateTemplateSubmitted {
            id: "retro".into(),
            name: "Retro".into(),
            description: "Sprint retro minutes".into(),
            prompt: "Summarize the retro".into(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::CreateTemplate {
            id: "retro".to_string(),
            name: "Retro".to_string(),
            description: "Sprint retro minutes".to_string(),
            prompt: "Summarize the retro".to_string(),
        }]
    );
}

#[test]
fn successful_mutation_reloads_the_list() {
    init_logging();
    let (_, effects) = update(AppState::new(), Msg::TemplateMutationFinished(Ok(())));
    assert_eq!(effects, vec![Effect::LoadTemplates]);
}

#[test]
fn failed_mutation_surfaces_without_a_reload() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::TemplateMutationFinished(Err("template not found".into())),
    );
    assert!(effects.is_empty());
    assert_eq!(
        state.view().templates_error,
        Some("template not found".to_string())
    );
}

//! Integration tests: bidirectional sync (dlg-editor ↔ dlg-core).
//!
//! Drives a `SyncSession` over an in-memory document the way a host editor
//! would: surface messages in, document text changes in, a clock ticking
//! forward, and checks what reaches the document and the surface.

use dlg_core::{ChangeSize, EditorConfig, Scene, SceneId, emit_dialogue, parse_dialogue};
use dlg_editor::{MemoryDocument, Origin, SceneMessage, SyncError, SyncSession, TextDocument, WriteOutcome};
use pretty_assertions::assert_eq;

const FIXTURE: &str = include_str!("fixtures/lighthouse.json");
const DELAY: u64 = 100;

fn open() -> SyncSession<MemoryDocument> {
    let config = EditorConfig {
        edit_delay_ms: DELAY,
        ..EditorConfig::default()
    };
    SyncSession::open(MemoryDocument::new(FIXTURE), &config).expect("fixture should open")
}

fn scene(session: &SyncSession<MemoryDocument>, tag: &str) -> Scene {
    session
        .store()
        .get(SceneId::intern(tag))
        .cloned()
        .unwrap_or_else(|| panic!("{tag} not in store"))
}

fn update(scene: Scene) -> SceneMessage {
    SceneMessage::UpdateScene {
        scene_id: scene.scene_id,
        scene_data: scene,
        update_info: None,
    }
}

// ─── Document → Surface ─────────────────────────────────────────────────

#[test]
fn opening_forwards_every_scene_to_the_surface() {
    let mut session = open();
    let outbound = session.take_outbound();

    let tags: Vec<&str> = outbound
        .iter()
        .map(|m| m.message.scene_id().as_str())
        .collect();
    assert_eq!(tags, vec!["keeper_hello", "keeper_thanks"]);

    let wire = serde_json::to_value(&outbound[0]).unwrap();
    assert_eq!(wire["messageSource"], "document");
    assert_eq!(wire["messageType"], "createScene");
    assert_eq!(wire["sceneData"]["npcName"], "Keeper");
}

#[test]
fn external_text_edit_reaches_surface_as_classified_update() {
    let mut session = open();
    session.take_outbound();

    let mut scenes = parse_dialogue(FIXTURE).unwrap();
    scenes[1].scene_text = "Much obliged, friend.".into();
    let text = emit_dialogue(&scenes, 4, "1.14.0").unwrap();
    session.document_mut().edit(text);
    session.document_changed().unwrap();

    let outbound = session.take_outbound();
    assert_eq!(outbound.len(), 1);
    assert_eq!(outbound[0].origin, Origin::Document);
    match &outbound[0].message {
        SceneMessage::UpdateScene { update_info, .. } => assert_eq!(
            update_info,
            &Some(ChangeSize::Minor {
                change_id: "keeper_thanks.sceneText.0".into()
            })
        ),
        other => panic!("expected an update, got {other:?}"),
    }
    // Document edits are never written back.
    assert!(!session.has_pending());
    assert_eq!(session.document().write_count(), 0);
}

#[test]
fn scene_removed_from_text_is_deleted_on_the_surface() {
    let mut session = open();
    session.take_outbound();

    let scenes = parse_dialogue(FIXTURE).unwrap();
    let text = emit_dialogue(&scenes[..1], 4, "1.14.0").unwrap();
    session.document_mut().edit(text);
    session.document_changed().unwrap();

    let outbound = session.take_outbound();
    assert_eq!(
        outbound.iter().map(|m| m.message.clone()).collect::<Vec<_>>(),
        vec![SceneMessage::DeleteScene {
            scene_id: SceneId::intern("keeper_thanks")
        }]
    );
    assert_eq!(session.store().len(), 1);
}

#[test]
fn unparseable_text_leaves_store_untouched() {
    let mut session = open();
    session.take_outbound();

    session.document_mut().edit("{ \"format_version\": ");
    let err = session.document_changed().unwrap_err();
    assert!(matches!(err, SyncError::Parse(_)));
    assert_eq!(session.store().len(), 2);
    assert!(session.take_outbound().is_empty());

    // Once the text is valid again, nothing changed as far as the store knows.
    session.document_mut().edit(FIXTURE);
    session.document_changed().unwrap();
    assert!(session.take_outbound().is_empty());
}

// ─── Surface → Document ─────────────────────────────────────────────────

#[test]
fn same_field_edits_coalesce_into_one_write() {
    let mut session = open();
    let first = scene(&session, "keeper_hello").with_npc_name("Kee");
    let second = scene(&session, "keeper_hello").with_npc_name("Keeper Mara");

    session.apply_surface_message(update(first), 0).unwrap();
    session.apply_surface_message(update(second.clone()), 50).unwrap();

    assert_eq!(session.tick(100), WriteOutcome::Idle);
    assert_eq!(session.tick(150), WriteOutcome::Written);
    assert_eq!(session.document().write_count(), 1);

    let written = parse_dialogue(&session.document().text()).unwrap();
    assert_eq!(written[0], second);
}

#[test]
fn editing_another_field_flushes_the_pending_one() {
    let mut session = open();
    let renamed = scene(&session, "keeper_hello").with_npc_name("Mara");
    session.apply_surface_message(update(renamed.clone()), 0).unwrap();

    let mut relabelled = renamed.clone();
    relabelled.buttons[1].display_name = "Maybe later".into();
    session.apply_surface_message(update(relabelled.clone()), 10).unwrap();

    assert_eq!(session.document().write_count(), 1);
    assert_eq!(parse_dialogue(&session.document().text()).unwrap()[0], renamed);
    assert_eq!(session.next_deadline(), Some(10 + DELAY));

    session.tick(10 + DELAY);
    assert_eq!(parse_dialogue(&session.document().text()).unwrap()[0], relabelled);
}

#[test]
fn structural_edit_bypasses_the_window() {
    let mut session = open();
    let mut thanks = scene(&session, "keeper_thanks");
    thanks.open_commands.push("/playsound random.levelup @initiator".into());

    let verdict = session.apply_surface_message(update(thanks), 0).unwrap();
    assert_eq!(verdict, ChangeSize::Major);
    assert!(!session.has_pending());
    assert_eq!(session.document().write_count(), 1);
}

#[test]
fn no_feedback_loop_after_own_write() {
    let mut session = open();
    session.take_outbound();

    let edited = scene(&session, "keeper_thanks").with_text("Much obliged!");
    session.apply_surface_message(update(edited), 0).unwrap();
    session.tick(DELAY);
    assert_eq!(session.document().write_count(), 1);

    // The host reports the write back as a document change.
    session.document_changed().unwrap();
    assert!(session.take_outbound().is_empty());
    assert!(!session.has_pending());
    assert_eq!(session.document().write_count(), 1);
}

#[test]
fn surface_messages_arrive_as_json() {
    let mut session = open();
    let raw = r#"{
        "messageType": "createScene",
        "sceneId": "keeper_night",
        "sceneData": {
            "sceneId": "keeper_night",
            "npcName": "Keeper",
            "sceneText": "The light is lit.",
            "buttons": [],
            "openCommands": [],
            "closeCommands": []
        }
    }"#;
    let message: SceneMessage = serde_json::from_str(raw).unwrap();
    session.apply_surface_message(message, 0).unwrap();

    let written = parse_dialogue(&session.document().text()).unwrap();
    let tags: Vec<&str> = written.iter().map(|s| s.scene_id.as_str()).collect();
    assert_eq!(tags, vec!["keeper_hello", "keeper_thanks", "keeper_night"]);
}

#[test]
fn flush_writes_pending_change_before_deadline() {
    let mut session = open();
    let edited = scene(&session, "keeper_thanks").with_npc_name("Old Keeper");
    session.apply_surface_message(update(edited), 0).unwrap();

    assert_eq!(session.flush(), WriteOutcome::Written);
    assert_eq!(session.tick(10 * DELAY), WriteOutcome::Idle);
    assert_eq!(session.document().write_count(), 1);
}

#[test]
fn failed_write_is_not_retried() {
    let mut session = open();
    session.document_mut().set_reject_writes(true);

    let edited = scene(&session, "keeper_thanks").with_npc_name("Old Keeper");
    session.apply_surface_message(update(edited), 0).unwrap();
    assert_eq!(session.tick(DELAY), WriteOutcome::Failed);
    assert!(!session.has_pending());
    assert_eq!(session.document().text(), FIXTURE);
}

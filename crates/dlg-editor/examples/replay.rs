//! Open a dialogue file, lay out every scene and replay a short surface
//! editing session against it, printing what the surface and the document
//! would see. Run with `RUST_LOG=debug` to watch the store and debouncer.
//!
//!     cargo run -p dlg-editor --example replay -- path/to/dialogue.json

use dlg_core::{DEFAULT_SCALE, EditorConfig, NodeKey, Point};
use dlg_editor::{LayoutData, MemoryDocument, MemoryStateStore, SceneMessage, SyncSession, TextDocument};
use std::env;
use std::error::Error;
use std::fs;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let Some(path) = env::args().nth(1) else {
        eprintln!("usage: replay <dialogue.json>");
        std::process::exit(2);
    };
    let text = fs::read_to_string(&path)?;

    let config = EditorConfig {
        edit_delay_ms: 250,
        ..EditorConfig::default()
    };
    let mut session = SyncSession::open(MemoryDocument::new(text), &config)?;

    for message in session.take_outbound() {
        println!("→ surface: {}", serde_json::to_string(&message)?);
    }

    // Scenes in a row, children arranged beneath each.
    let mut layout = LayoutData::load(MemoryStateStore::new(), "replay/layout");
    let order = session.store().order().to_vec();
    for (column, scene_id) in order.iter().enumerate() {
        let Some(scene) = session.store().get(*scene_id) else {
            continue;
        };
        layout.set_node_position(NodeKey::Scene(*scene_id), Point::new(column as f32 * 1_000.0, 0.0))?;
        layout.auto_arrange(scene, DEFAULT_SCALE)?;
        for slot in 0..scene.buttons.len() {
            if let Some(p) = layout.node_position(&NodeKey::Button(*scene_id, slot)) {
                println!("{scene_id} button {slot} at ({:.0}, {:.0})", p.x, p.y);
            }
        }
    }

    // Two keystrokes on the same field, then a tick past the window.
    let Some(first) = order.first().and_then(|id| session.store().get(*id)).cloned() else {
        println!("no scenes to edit");
        return Ok(());
    };
    let mut now = 0;
    for suffix in ["!", "!!"] {
        let edited = first.clone().with_npc_name(format!("{}{suffix}", first.npc_name));
        let verdict = session.apply_surface_message(
            SceneMessage::UpdateScene {
                scene_id: edited.scene_id,
                scene_data: edited,
                update_info: None,
            },
            now,
        )?;
        println!("t={now}ms surface edit: {verdict:?}");
        now += 100;
    }
    if let Some(deadline) = session.next_deadline() {
        println!("t={deadline}ms tick: {:?}", session.tick(deadline));
    }

    let document = session.close();
    println!("document written {} time(s):\n{}", document.write_count(), document.text());
    Ok(())
}

//! Record a short session on a login page and print the Cypress script

#![recursion_limit = "256"]

use dom::NodeId;
use protocol::EventType;
use recorder::{DomEvent, EventRecorder, Page, RecorderConfig};

const PAGE_URL: &str = "https://shop.example.com/login?next=%2Fcart";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // What a DOM.getDocument + snapshot merge would hand us
    let dom_tree = serde_json::json!({
        "root": {
            "nodeId": 1, "backendNodeId": 1, "nodeType": 9, "nodeName": "#document",
            "children": [{
                "nodeId": 2, "backendNodeId": 2, "nodeType": 1, "nodeName": "HTML",
                "children": [{
                    "nodeId": 3, "backendNodeId": 3, "nodeType": 1, "nodeName": "BODY",
                    "bounds": [0, 0, 1280, 800],
                    "children": [{
                        "nodeId": 4, "backendNodeId": 4, "nodeType": 1, "nodeName": "FORM",
                        "attributes": ["data-cy", "login-form"],
                        "bounds": [0, 0, 400, 200],
                        "children": [
                            { "nodeId": 5, "backendNodeId": 5, "nodeType": 1, "nodeName": "INPUT",
                              "attributes": ["id", "email", "type", "email"],
                              "value": "ada@example.com", "bounds": [0, 0, 300, 30] },
                            { "nodeId": 6, "backendNodeId": 6, "nodeType": 1, "nodeName": "INPUT",
                              "attributes": ["type", "checkbox", "name", "remember"],
                              "bounds": [0, 40, 16, 16] },
                            { "nodeId": 7, "backendNodeId": 7, "nodeType": 1, "nodeName": "BUTTON",
                              "bounds": [0, 80, 120, 30],
                              "children": [
                                  { "nodeId": 8, "backendNodeId": 8, "nodeType": 3,
                                    "nodeName": "#text", "nodeValue": "Log in" }
                              ] }
                        ]
                    }]
                }]
            }]
        }
    });

    let page = Page::from_cdp(PAGE_URL, &dom_tree)?;
    let node = |backend: u32| -> NodeId {
        page.document()
            .get_node_id_by_backend(backend)
            .unwrap_or_default()
    };
    let (email, remember, button) = (node(5), node(6), node(7));

    let (recorder, mut receiver) = EventRecorder::initialize(page, RecorderConfig::default());
    println!("Recording on port '{}'", receiver.name());

    let events = [
        DomEvent::trusted(EventType::Click, email),
        DomEvent::trusted(EventType::KeyDown, email).with_key("a"),
        DomEvent::trusted(EventType::KeyDown, email).with_key("Backspace"),
        DomEvent::trusted(EventType::Change, email),
        DomEvent::trusted(EventType::Change, remember),
        DomEvent::synthetic(EventType::Click, button),
        DomEvent::trusted(EventType::Click, button),
    ];
    for event in &events {
        recorder.handle_event(event);
    }

    let mut script = vec![codegen::create_visit(PAGE_URL)];
    for record in receiver.drain() {
        println!("{}", record.to_json()?);
        if let Some(line) = codegen::create_block(&record)? {
            script.push(line);
        }
    }
    script.push(codegen::create_url(PAGE_URL)?);

    println!();
    for line in &script {
        println!("{}", line);
    }

    recorder.shutdown();
    Ok(())
}

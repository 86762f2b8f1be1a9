use portfolio_api::models::{BlogPost, ContactInfo, Entity, Project, StoreStatus, TableStatus};
use serde_json::json;

// --- Wire format ---

#[test]
fn test_project_serializes_camel_case() {
    let project = Project {
        id: Some(3),
        title: "Arena".into(),
        description: Some("Final year showcase".into()),
        repo_link: Some("https://github.com/example/arena".into()),
        framework_flag: true,
    };

    let value = serde_json::to_value(&project).unwrap();
    assert_eq!(
        value,
        json!({
            "id": 3,
            "title": "Arena",
            "description": "Final year showcase",
            "repoLink": "https://github.com/example/arena",
            "frameworkFlag": true
        })
    );
}

#[test]
fn test_project_accepts_legacy_field_names() {
    // CRITICAL: older clients still send `githubLink` and `springBoot`.
    let project: Project = serde_json::from_value(json!({
        "title": "Legacy",
        "githubLink": "https://github.com/example/legacy",
        "springBoot": true
    }))
    .unwrap();

    assert_eq!(
        project.repo_link.as_deref(),
        Some("https://github.com/example/legacy")
    );
    assert!(project.framework_flag);
    assert_eq!(project.id, None);
}

#[test]
fn test_missing_fields_take_defaults() {
    let project: Project = serde_json::from_value(json!({})).unwrap();
    assert_eq!(project, Project::default());
    assert!(!project.framework_flag);

    let post: BlogPost = serde_json::from_value(json!({ "title": "Only a title" })).unwrap();
    assert_eq!(post.content, "");

    let contact: ContactInfo = serde_json::from_value(json!({ "phone": "+44 1234" })).unwrap();
    assert_eq!(contact.phone.as_deref(), Some("+44 1234"));
    assert!(contact.email.is_none() && contact.linkedin.is_none() && contact.github.is_none());
}

#[test]
fn test_null_id_is_the_unsaved_state() {
    let post: BlogPost =
        serde_json::from_value(json!({ "id": null, "title": "t", "content": "c" })).unwrap();
    assert_eq!(post.id(), None);

    let value = serde_json::to_value(&post).unwrap();
    assert!(value["id"].is_null());
}

#[test]
fn test_wrong_types_are_rejected() {
    assert!(serde_json::from_value::<Project>(json!({ "frameworkFlag": "yes" })).is_err());
    assert!(serde_json::from_value::<BlogPost>(json!({ "id": "one" })).is_err());
}

// --- Entity metadata ---

#[test]
fn test_entity_kinds_and_tables() {
    assert_eq!((Project::KIND, Project::TABLE), ("Project", "projects"));
    assert_eq!((BlogPost::KIND, BlogPost::TABLE), ("BlogPost", "blog_posts"));
    assert_eq!(
        (ContactInfo::KIND, ContactInfo::TABLE),
        ("ContactInfo", "contact_info")
    );
}

#[test]
fn test_set_id_overwrites() {
    let mut contact = ContactInfo {
        id: Some(1),
        ..Default::default()
    };
    contact.set_id(Some(8));
    assert_eq!(contact.id(), Some(8));
    contact.set_id(None);
    assert_eq!(contact.id, None);
}

#[test]
fn test_store_status_shape() {
    let status = StoreStatus {
        backend: "postgres".into(),
        tables: vec![TableStatus {
            name: "projects".into(),
            rows: 2,
        }],
    };
    assert_eq!(
        serde_json::to_value(&status).unwrap(),
        json!({ "backend": "postgres", "tables": [{ "name": "projects", "rows": 2 }] })
    );
}

//! Two-pass restore integration tests

use std::collections::BTreeMap;

use cabinetkit_core::NoticeLevel;
use cabinetkit_designer::{
    AdditionalWall, CabinetId, CabinetSyncRecord, CabinetType, Dimensions, GroupMember,
    PanelState, ParentRole, Position, ProductRef, RoomDocument, SavedCabinet, SavedView, ViewId,
};

use crate::common::{base, fixture, full_config};

fn saved(id: &str, cabinet_type: CabinetType) -> SavedCabinet {
    SavedCabinet::new(
        CabinetId::from(id),
        cabinet_type,
        Dimensions::new(600.0, 720.0, 560.0),
    )
}

fn live_id(report: &cabinetkit_designer::RestoreReport, old: &str) -> CabinetId {
    report
        .identity_map
        .cabinet(&CabinetId::from(old))
        .cloned()
        .unwrap_or_else(|| panic!("{} was not restored", old))
}

#[tokio::test]
async fn test_parent_remapped_to_new_identity() {
    let fx = fixture();
    let mut doc = RoomDocument::new("Kitchen");
    let a = saved("1", CabinetType::Base);
    let mut b = saved("2", CabinetType::Panel);
    b.relations.parent = Some(CabinetId::from("1"));
    doc.cabinets = vec![a, b];

    let report = fx.state.restorer.restore(&doc).await.unwrap();

    let new_a = live_id(&report, "1");
    let new_b = live_id(&report, "2");
    assert_ne!(new_a, CabinetId::from("1"));
    assert_ne!(new_b, CabinetId::from("2"));

    let scene = fx.state.scene.read();
    assert_eq!(scene.cabinet(&new_b).unwrap().relations.parent, Some(new_a));
    assert!(scene.cabinet(&live_id(&report, "1")).unwrap().relations.is_empty());
    assert_eq!(report.unresolved_relations, 0);
}

#[tokio::test]
async fn test_all_relationships_with_forward_references() {
    let fx = fixture();
    let mut doc = RoomDocument::new("Kitchen");

    // The child comes before every parent it points at.
    let mut child = saved("child", CabinetType::Base);
    let parents = [
        (ParentRole::Parent, "p-parent", CabinetType::Base),
        (ParentRole::KickerParent, "p-kicker", CabinetType::Kicker),
        (ParentRole::BulkheadParent, "p-bulkhead", CabinetType::Bulkhead),
        (ParentRole::UnderPanelParent, "p-under", CabinetType::Panel),
        (ParentRole::BenchtopParent, "p-bench", CabinetType::Benchtop),
    ];
    for (role, id, _) in &parents {
        child.relations.set(*role, Some(CabinetId::from(*id)));
    }
    doc.cabinets.push(child);
    for (_, id, cabinet_type) in &parents {
        doc.cabinets.push(saved(id, *cabinet_type));
    }

    let report = fx.state.restorer.restore(&doc).await.unwrap();
    assert_eq!(report.created.len(), 6);
    assert_eq!(report.unresolved_relations, 0);

    let scene = fx.state.scene.read();
    let restored = scene.cabinet(&live_id(&report, "child")).unwrap();
    for (role, id, _) in &parents {
        assert_eq!(
            restored.relations.get(*role),
            Some(&live_id(&report, id)),
            "{} was not remapped",
            role.field_name()
        );
    }
}

#[tokio::test]
async fn test_dangling_reference_left_unset() {
    let fx = fixture();
    let mut doc = RoomDocument::new("Kitchen");
    let mut panel = saved("2", CabinetType::Panel);
    panel.relations.parent = Some(CabinetId::from("999"));
    panel.relations.kicker_parent = Some(CabinetId::from("1"));
    doc.cabinets = vec![saved("1", CabinetType::Base), panel];

    let report = fx.state.restorer.restore(&doc).await.unwrap();
    assert_eq!(report.unresolved_relations, 1);

    let scene = fx.state.scene.read();
    let restored = scene.cabinet(&live_id(&report, "2")).unwrap();
    assert_eq!(restored.relations.parent, None);
    assert_eq!(
        restored.relations.kicker_parent,
        Some(live_id(&report, "1"))
    );
}

#[tokio::test]
async fn test_factory_failure_skips_only_that_cabinet() {
    let fx = fixture();
    fx.factory.refuse(CabinetType::Appliance);

    let mut doc = RoomDocument::new("Kitchen");
    let mut top = saved("3", CabinetType::Top);
    top.relations.parent = Some(CabinetId::from("2"));
    top.group = vec![
        GroupMember::new(CabinetId::from("1"), 60.0),
        GroupMember::new(CabinetId::from("2"), 40.0),
    ];
    let unknown = saved("4", CabinetType::Unknown);
    doc.cabinets = vec![
        saved("1", CabinetType::Base),
        saved("2", CabinetType::Appliance),
        top,
        unknown,
    ];
    doc.cabinet_syncs = vec![CabinetSyncRecord {
        cabinet_id: CabinetId::from("2"),
        synced_cabinet_ids: vec![CabinetId::from("1")],
    }];

    let report = fx.state.restorer.restore(&doc).await.unwrap();

    assert_eq!(report.created.len(), 2);
    let skipped: Vec<_> = report
        .skipped
        .iter()
        .map(|s| s.cabinet_id.as_str())
        .collect();
    assert_eq!(skipped, vec!["2", "4"]);
    assert_eq!(report.unresolved_relations, 1);
    assert_eq!(report.dropped_group_members, 1);
    assert_eq!(report.dropped_sync_members, 1);

    let scene = fx.state.scene.read();
    let new_top = live_id(&report, "3");
    assert_eq!(scene.cabinet(&new_top).unwrap().relations.parent, None);
    assert_eq!(
        scene.group(&new_top),
        &[GroupMember::new(live_id(&report, "1"), 60.0)]
    );
    assert!(scene.syncs.is_empty());
    drop(scene);

    let notices = fx.notices.lock();
    assert!(notices
        .iter()
        .any(|n| n.level == NoticeLevel::Warning && n.message.contains("2 cabinets")));
}

#[tokio::test]
async fn test_groups_and_syncs_drop_empty_entries() {
    let fx = fixture();
    let mut doc = RoomDocument::new("Kitchen");
    let mut a = saved("1", CabinetType::Base);
    a.group = vec![GroupMember::new(CabinetId::from("gone"), 100.0)];
    let mut b = saved("2", CabinetType::Base);
    b.group = vec![
        GroupMember::new(CabinetId::from("1"), 50.0),
        GroupMember::new(CabinetId::from("2"), 50.0),
    ];
    doc.cabinets = vec![a, b];
    doc.cabinet_syncs = vec![
        CabinetSyncRecord {
            cabinet_id: CabinetId::from("1"),
            synced_cabinet_ids: vec![CabinetId::from("gone")],
        },
        CabinetSyncRecord {
            cabinet_id: CabinetId::from("2"),
            synced_cabinet_ids: vec![CabinetId::from("1"), CabinetId::from("gone")],
        },
    ];

    let report = fx.state.restorer.restore(&doc).await.unwrap();
    let (new_a, new_b) = (live_id(&report, "1"), live_id(&report, "2"));

    let scene = fx.state.scene.read();
    assert!(scene.group(&new_a).is_empty());
    assert_eq!(
        scene.group(&new_b),
        &[
            GroupMember::new(new_a.clone(), 50.0),
            GroupMember::new(new_b.clone(), 50.0)
        ]
    );
    assert!(scene.synced(&new_a).is_empty());
    assert_eq!(scene.synced(&new_b), &[new_a.clone()]);
    assert_eq!(scene.groups.len(), 1);
    assert_eq!(scene.syncs.len(), 1);
    assert_eq!(report.dropped_group_members, 1);
    assert_eq!(report.dropped_sync_members, 2);
}

#[tokio::test]
async fn test_view_order_survives_round_trip() {
    let source = fixture();
    let a = source.add(base(600.0));
    let b = source.add(base(450.0));
    {
        let mut scene = source.state.scene.write();
        let sink = scene.views.create_named_view("Sink");
        let pantry = scene.views.create_named_view("Pantry");
        scene.views.assign_cabinet_to_view(&a, &pantry);
        scene.views.assign_cabinet_to_view(&b, &sink);
    }
    let before = source.state.snapshot();

    let target = fixture();
    target.state.restorer.restore(&before).await.unwrap();
    let after = target.state.snapshot();

    let names = |doc: &RoomDocument| doc.views.iter().map(|v| v.name.clone()).collect::<Vec<_>>();
    assert_eq!(names(&before), ["Sink", "Pantry"]);
    assert_eq!(names(&after), names(&before));
}

#[tokio::test]
async fn test_views_and_wall_links() {
    let fx = fixture();
    let mut doc = RoomDocument::new("Kitchen");

    let mut a = saved("1", CabinetType::Base);
    a.view_id = Some(ViewId::from("v1"));
    let mut b = saved("2", CabinetType::Base);
    b.view_id = Some(ViewId::from("v1"));
    let mut c = saved("3", CabinetType::Tall);
    c.view_id = Some(ViewId::from("v2"));
    doc.cabinets = vec![a, b, c];
    doc.views = vec![
        SavedView {
            id: ViewId::from("v1"),
            name: "Sink run".to_string(),
            cabinet_ids: vec![CabinetId::from("1"), CabinetId::from("2")],
        },
        SavedView {
            id: ViewId::from("v3"),
            name: "Pantry".to_string(),
            cabinet_ids: Vec::new(),
        },
    ];
    let mut linked = AdditionalWall::new(1200.0, 90.0);
    linked.linked_view_id = Some(ViewId::from("v1"));
    let mut broken = AdditionalWall::new(2400.0, 90.0);
    broken.linked_view_id = Some(ViewId::from("nope"));
    doc.wall_settings.additional_walls = vec![linked.clone(), broken];

    let report = fx.state.restorer.restore(&doc).await.unwrap();
    let scene = fx.state.scene.read();

    assert_eq!(scene.views.len(), 3);
    let sink = report.identity_map.view(&ViewId::from("v1")).unwrap().clone();
    assert_ne!(sink, ViewId::from("v1"));
    assert_eq!(scene.views.get_view(&sink).unwrap().name, "Sink run");
    assert_eq!(
        scene.views.cabinets_in_view(&sink),
        &[live_id(&report, "1"), live_id(&report, "2")]
    );

    let tall = live_id(&report, "3");
    let tall_view = scene.views.cabinet_view(&tall).unwrap().clone();
    assert_ne!(tall_view, sink);
    assert_eq!(scene.cabinet(&tall).unwrap().view_id, Some(tall_view));

    let pantry = report.identity_map.view(&ViewId::from("v3")).unwrap();
    assert_eq!(scene.views.get_view(pantry).unwrap().name, "Pantry");

    let names: Vec<_> = scene.views.views().iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, ["Sink run", "Pantry", "View 3"]);

    let walls = &scene.walls.additional_walls;
    assert_eq!(walls[0].id, linked.id);
    assert_eq!(walls[0].linked_view_id, Some(sink));
    assert_eq!(walls[1].linked_view_id, None);
}

#[tokio::test]
async fn test_fields_and_panel_state_reseeded() {
    let fx = fixture();
    let mut doc = RoomDocument::new("Kitchen");
    let mut a = saved("1", CabinetType::Base);
    a.product = ProductRef::new("p-base", "Base 600");
    a.dimensions = Dimensions::new(450.0, 700.0, 580.0);
    a.position = Position::new(100.0, 0.0, 20.0);
    a.locks.right_lock = true;
    a.sort_number = Some(7);
    a.config.door_count = Some(1);
    a.material_color = Some("walnut".to_string());
    a.dimension_values = Some(BTreeMap::from([("width".to_string(), 450.0)]));
    doc.cabinets = vec![a];

    let report = fx.state.restorer.restore(&doc).await.unwrap();
    assert_eq!(report.catalog.requested, 1);
    assert_eq!(report.catalog.loaded, 1);

    let id = live_id(&report, "1");
    let scene = fx.state.scene.read();
    let cabinet = scene.cabinet(&id).unwrap();
    assert_eq!(cabinet.dimensions, Dimensions::new(450.0, 700.0, 580.0));
    assert_eq!(cabinet.position, Position::new(100.0, 0.0, 20.0));
    assert!(cabinet.locks.right_lock);
    assert!(!cabinet.locks.left_lock);
    assert_eq!(cabinet.sort_number, Some(7));
    assert!(cabinet.skip_dimension_defaults);
    // Saved value wins, unset fields come from the product schema.
    assert_eq!(cabinet.config.door_count, Some(1));
    assert_eq!(cabinet.config.shelf_count, Some(1));
    assert_eq!(cabinet.product.product_name.as_deref(), Some("Base 600"));

    let panel = fx.state.panel_state.get(&id).unwrap();
    assert_eq!(
        panel,
        PanelState {
            dimension_values: Some(BTreeMap::from([("width".to_string(), 450.0)])),
            material_color: Some("walnut".to_string()),
            ..Default::default()
        }
    );
    assert_eq!(fx.state.panel_state.len(), 1);
}

#[tokio::test]
async fn test_missing_products_reported() {
    let fx = fixture();
    let mut doc = RoomDocument::new("Kitchen");
    let mut a = saved("1", CabinetType::Base);
    a.product.product_id = Some("p-missing".to_string());
    let mut b = saved("2", CabinetType::Base);
    b.product.product_id = Some("p-missing".to_string());
    doc.cabinets = vec![a, b];

    let report = fx.state.restorer.restore(&doc).await.unwrap();
    assert_eq!(report.catalog.requested, 1);
    assert_eq!(report.catalog.failed_ids(), vec!["p-missing".to_string()]);
    // Cabinets still restore with type defaults.
    assert_eq!(report.created.len(), 2);

    let notices = fx.notices.lock();
    assert!(notices
        .iter()
        .any(|n| n.message.contains("1 of 1 products")));
}

#[tokio::test]
async fn test_restore_replaces_scene_and_keeps_camera() {
    let fx = fixture();
    let old = fx.add(base(600.0));
    fx.state.panel_state.update(&old, |s| s.price = Some(99.0));
    fx.state.scene.write().camera.zoom = 3.0;

    let mut doc = RoomDocument::new("Kitchen");
    doc.wall_settings.height = 2700.0;
    doc.cabinets = vec![saved("1", CabinetType::Top)];

    fx.state.restorer.restore(&doc).await.unwrap();

    let scene = fx.state.scene.read();
    assert_eq!(scene.cabinet_count(), 1);
    assert!(scene.cabinet(&old).is_none());
    assert_eq!(scene.walls.height, 2700.0);
    assert_eq!(scene.camera.zoom, 3.0);
    assert!(fx.state.panel_state.get(&old).is_none());
}

#[tokio::test]
async fn test_serialize_restore_round_trip() {
    let source = fixture();
    let a = source.add(base(600.0).with_position(Position::new(0.0, 0.0, 0.0)));
    let mut panel = cabinetkit_designer::Cabinet::new(
        CabinetType::Panel,
        Dimensions::new(16.0, 720.0, 560.0),
    )
    .with_position(Position::new(600.0, 0.0, 0.0));
    panel.config = full_config(1);
    panel.relations.set(ParentRole::Parent, Some(a.clone()));
    source.add(panel);

    let document = source.state.snapshot();

    let target = fixture();
    target.state.restorer.restore(&document).await.unwrap();

    assert_eq!(
        source.structure(),
        target.structure()
    );
    assert_eq!(target.factory.created(), 2);
}

//! Repository Integration Tests
//!
//! Repositories against the in-memory backend, one fresh backend per test.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use serde_json::Value;
    use uuid::Uuid;

    use crate::backend::{Backend, MemoryBackend, MemoryStorage, Query, SharedBackend, SharedStorage};
    use crate::domain::*;
    use crate::repository::*;

    fn setup() -> (Arc<MemoryBackend>, SharedBackend) {
        let memory = Arc::new(MemoryBackend::new());
        let shared: SharedBackend = memory.clone();
        (memory, shared)
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    /// 2 meals x 3 foods, one substitution on the first food
    fn sample_diet() -> DietTree {
        let mut tree = DietTree::new(DietPlan::template("Definición".to_string()));
        for meal in ["Desayuno", "Comida"] {
            let mut group = GroupBranch::<DietKind>::new(Meal::new(tree.id(), meal.to_string()));
            for food in ["Avena", "Huevos", "Fruta"] {
                let leaf = LeafBranch::new(Food::new(group.node.id, food.to_string(), "100 g".to_string()));
                group.push_leaf(leaf);
            }
            tree.push_group(group);
        }
        let food_id = tree.groups[0].leaves[0].node.id;
        tree.groups[0].leaves[0].push_substitution(FoodSubstitution::new(
            food_id,
            "Pan integral".to_string(),
            "60 g".to_string(),
        ));
        tree
    }

    fn sample_workout() -> WorkoutTree {
        let mut tree = WorkoutTree::new(WorkoutPlan::template("Fuerza 3 días".to_string()));
        let mut legs = GroupBranch::<WorkoutKind>::new(WorkoutDay::new(tree.id(), "Día 1 - Pierna".to_string()));
        let mut squat = LeafBranch::<WorkoutKind>::new(Exercise::new(legs.node.id, "Sentadilla".to_string(), 4, "8-10".to_string()));
        squat.push_substitution(ExerciseSubstitution::new(squat.node.id, "Prensa".to_string()));
        legs.push_leaf(squat);
        tree.push_group(legs);
        tree
    }

    // ========================
    // Table repository
    // ========================

    #[tokio::test]
    async fn test_table_repository_crud() {
        let (_, backend) = setup();
        let repo: TableRepository<Guideline> = TableRepository::new(backend);

        let created = repo
            .create(&Guideline::new("Agua".to_string(), "Bebe **2 litros**".to_string()))
            .await
            .expect("Failed to create");
        let found = repo.find_by_id(created.id).await.expect("Find failed");
        assert_eq!(found.as_ref().map(|g| g.title.as_str()), Some("Agua"));

        let mut changed = created.clone();
        changed.title = "Hidratación".to_string();
        let updated = repo.update(&changed).await.expect("Update failed");
        assert_eq!(updated.title, "Hidratación");

        repo.delete(created.id).await.expect("Delete failed");
        assert!(repo.find_by_id(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_creates_then_updates() {
        let (memory, backend) = setup();
        let repo: TableRepository<Guideline> = TableRepository::new(backend);
        let mut guideline = Guideline::new("Sueño".to_string(), "8 horas".to_string());

        repo.upsert(&guideline).await.unwrap();
        guideline.content = "7-9 horas".to_string();
        repo.upsert(&guideline).await.unwrap();

        let rows = memory.rows("guidelines");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["content"], "7-9 horas");
    }

    #[tokio::test]
    async fn test_update_missing_row_is_not_found() {
        let (_, backend) = setup();
        let repo: TableRepository<Guideline> = TableRepository::new(backend);
        let result = repo.update(&Guideline::new("x".to_string(), String::new())).await;
        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }

    // ========================
    // Plan trees
    // ========================

    #[tokio::test]
    async fn test_insert_and_load_tree() {
        let (memory, backend) = setup();
        let repo = DietRepository::new(backend);
        let tree = sample_diet();
        repo.insert_tree(&tree).await.expect("Insert failed");

        let loaded = repo.load_tree(tree.id()).await.expect("Load failed");
        assert_eq!(loaded.all_ids(), tree.all_ids());
        assert_eq!(loaded.groups[1].leaves[2].node.name, "Fruta");
        assert_eq!(loaded.groups[0].leaves[0].substitutions[0].name, "Pan integral");

        let inserts: Vec<String> = memory
            .calls()
            .into_iter()
            .filter(|c| c.starts_with("insert:"))
            .collect();
        assert_eq!(
            inserts,
            vec!["insert:diets", "insert:meals", "insert:foods", "insert:food_substitutions"]
        );
    }

    #[tokio::test]
    async fn test_load_missing_tree_is_not_found() {
        let (_, backend) = setup();
        let repo = DietRepository::new(backend);
        let result = repo.load_tree(Uuid::new_v4()).await;
        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_duplicate_persists_independent_copy() {
        let (memory, backend) = setup();
        let repo = DietRepository::new(backend);
        let source = sample_diet();
        repo.insert_tree(&source).await.unwrap();

        let copy = repo.duplicate(source.id()).await.expect("Duplicate failed");
        assert_eq!(copy.root.name, "Definición (Copia)");
        assert!(copy.root.is_template);
        assert_eq!(memory.rows("diets").len(), 2);
        assert_eq!(memory.rows("meals").len(), 4);
        assert_eq!(memory.rows("foods").len(), 12);
        assert_eq!(memory.rows("food_substitutions").len(), 2);

        let reloaded_source = repo.load_tree(source.id()).await.unwrap();
        assert_eq!(reloaded_source.all_ids(), source.all_ids());
        assert_eq!(reloaded_source.root.name, "Definición");

        let reloaded_copy = repo.load_tree(copy.id()).await.unwrap();
        assert_eq!(reloaded_copy.node_count(), source.node_count());
        let source_ids: std::collections::HashSet<Uuid> = source.all_ids().into_iter().collect();
        assert!(reloaded_copy.all_ids().iter().all(|id| !source_ids.contains(id)));
    }

    #[tokio::test]
    async fn test_two_duplicates_coexist() {
        let (memory, backend) = setup();
        let repo = DietRepository::new(backend);
        let source = sample_diet();
        repo.insert_tree(&source).await.unwrap();

        let first = repo.duplicate(source.id()).await.unwrap();
        let second = repo.duplicate(source.id()).await.unwrap();
        assert_ne!(first.id(), second.id());
        assert_eq!(memory.rows("diets").len(), 3);
        assert_eq!(repo.list_templates().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_duplicate_partial_write_keeps_earlier_levels() {
        let (memory, backend) = setup();
        let repo = DietRepository::new(backend);
        let source = sample_diet();
        repo.insert_tree(&source).await.unwrap();

        memory.fail_inserts_into("foods", DomainError::Network("offline".to_string()));
        let result = repo.duplicate(source.id()).await;

        match result {
            Err(DomainError::PartialWrite { completed, total, cause }) => {
                assert_eq!(completed, 2);
                assert_eq!(total, 4);
                assert_eq!(*cause, DomainError::Network("offline".to_string()));
            }
            other => panic!("expected partial write, got {:?}", other),
        }
        // No rollback: the copied root and meals stay behind
        assert_eq!(memory.rows("diets").len(), 2);
        assert_eq!(memory.rows("meals").len(), 4);
        assert_eq!(memory.rows("foods").len(), 6);
    }

    #[tokio::test]
    async fn test_failed_root_insert_is_not_partial() {
        let (memory, backend) = setup();
        let repo = DietRepository::new(backend);
        memory.fail_inserts_into("diets", DomainError::Timeout(30));
        let result = repo.insert_tree(&sample_diet()).await;
        assert_eq!(result, Err(DomainError::Timeout(30)));
        assert!(memory.rows("meals").is_empty());
    }

    #[tokio::test]
    async fn test_save_tree_replaces_children() {
        let (memory, backend) = setup();
        let repo = DietRepository::new(backend);
        let source = sample_diet();
        repo.insert_tree(&source).await.unwrap();

        let mut editing = repo.load_tree(source.id()).await.unwrap();
        editing.root.name = "Definición v2".to_string();
        editing.remove_group(0);
        editing.groups[0].move_leaf(2, 0);
        repo.save_tree(&mut editing).await.expect("Save failed");

        assert_eq!(memory.rows("meals").len(), 1);
        assert_eq!(memory.rows("foods").len(), 3);
        assert!(memory.rows("food_substitutions").is_empty());

        let reloaded = repo.load_tree(source.id()).await.unwrap();
        assert_eq!(reloaded.root.name, "Definición v2");
        assert_eq!(reloaded.groups[0].node.name, "Comida");
        assert_eq!(reloaded.groups[0].node.order_index, 0);
        let names: Vec<&str> = reloaded.groups[0].leaves.iter().map(|l| l.node.name.as_str()).collect();
        assert_eq!(names, vec!["Fruta", "Avena", "Huevos"]);
    }

    #[tokio::test]
    async fn test_delete_tree_removes_everything() {
        let (memory, backend) = setup();
        let repo = DietRepository::new(backend);
        let tree = sample_diet();
        repo.insert_tree(&tree).await.unwrap();

        repo.delete_tree(tree.id()).await.expect("Delete failed");
        for table in ["diets", "meals", "foods", "food_substitutions"] {
            assert!(memory.rows(table).is_empty(), "{} not empty", table);
        }
        let deletes: Vec<String> = memory
            .calls()
            .into_iter()
            .filter(|c| c.starts_with("delete:"))
            .collect();
        assert_eq!(
            deletes,
            vec!["delete:food_substitutions", "delete:foods", "delete:meals", "delete:diets"]
        );
    }

    #[tokio::test]
    async fn test_assign_to_client() {
        let (_, backend) = setup();
        let repo = WorkoutRepository::new(backend);
        let template = sample_workout();
        repo.insert_tree(&template).await.unwrap();
        let client = Uuid::new_v4();

        let assigned = repo.assign_to_client(template.id(), client).await.expect("Assign failed");
        assert_eq!(assigned.root.name, "Fuerza 3 días");
        assert_eq!(assigned.root.client_id, Some(client));
        assert!(!assigned.root.is_template);

        let templates = repo.list_templates().await.unwrap();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].id, template.id());

        let current = repo.current_for_client(client).await.unwrap().expect("client plan");
        assert_eq!(current.id(), assigned.id());
        assert_eq!(current.groups[0].leaves[0].substitutions[0].name, "Prensa");
        assert!(repo.current_for_client(Uuid::new_v4()).await.unwrap().is_none());
    }

    // ========================
    // Profiles
    // ========================

    #[tokio::test]
    async fn test_profiles_roster_and_roles() {
        let (_, backend) = setup();
        let rows: TableRepository<Profile> = TableRepository::new(backend.clone());
        let admin = Profile::new(Uuid::new_v4(), "coach@example.com".into(), "Coach".into(), Role::Admin);
        let ana = Profile::new(Uuid::new_v4(), "ana@example.com".into(), "Ana".into(), Role::Client);
        let mut bea = Profile::new(Uuid::new_v4(), "bea@example.com".into(), "Bea".into(), Role::Client);
        bea.active = false;
        for p in [&admin, &ana, &bea] {
            rows.create(p).await.unwrap();
        }

        let repo = ProfileRepository::new(backend);
        assert_eq!(repo.role_of(admin.id).await.unwrap(), Role::Admin);
        assert!(matches!(repo.role_of(Uuid::new_v4()).await, Err(DomainError::NotFound(_))));

        let clients = repo.list_clients().await.unwrap();
        let names: Vec<&str> = clients.iter().map(|p| p.display_name()).collect();
        assert_eq!(names, vec!["Ana", "Bea"]);

        repo.set_active(bea.id, true).await.unwrap();
        assert!(repo.get(bea.id).await.unwrap().unwrap().active);
    }

    // ========================
    // Progress
    // ========================

    #[tokio::test]
    async fn test_log_weight_updates_same_day() {
        let (memory, backend) = setup();
        let repo = ProgressRepository::new(backend);
        let client = Uuid::new_v4();

        repo.log_weight(client, day(1), 80.0).await.unwrap();
        let entry = repo.log_weight(client, day(1), 79.6).await.unwrap();
        assert_eq!(entry.weight_kg, Some(79.6));
        assert_eq!(memory.rows("progress").len(), 1);

        repo.log_weight(client, day(2), 79.2).await.unwrap();
        assert_eq!(memory.rows("progress").len(), 2);
    }

    #[tokio::test]
    async fn test_same_day_update_targets_progress_table() {
        let (memory, backend) = setup();
        let repo = ProgressRepository::new(backend);
        let client = Uuid::new_v4();

        repo.add_water(client, day(4), 250).await.unwrap();
        repo.add_water(client, day(4), 250).await.unwrap();
        let update = format!("update:{}", <ProgressEntry as Entity>::TABLE);
        assert_eq!(memory.calls().iter().filter(|c| **c == update).count(), 1);
    }

    #[tokio::test]
    async fn test_invalid_weight_never_reaches_backend() {
        let (memory, backend) = setup();
        let repo = ProgressRepository::new(backend);
        let result = repo.log_weight(Uuid::new_v4(), day(1), 5.0).await;
        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
        assert!(memory.calls().is_empty());
    }

    #[tokio::test]
    async fn test_add_water_accumulates() {
        let (_, backend) = setup();
        let repo = ProgressRepository::new(backend);
        let client = Uuid::new_v4();

        repo.add_water(client, day(3), 250).await.unwrap();
        let entry = repo.add_water(client, day(3), 500).await.unwrap();
        assert_eq!(entry.water_ml, 750);
        assert_eq!(entry.weight_kg, None);
    }

    #[tokio::test]
    async fn test_history_and_trend() {
        let (_, backend) = setup();
        let repo = ProgressRepository::new(backend);
        let client = Uuid::new_v4();
        repo.log_weight(client, day(10), 78.0).await.unwrap();
        repo.log_weight(client, day(1), 80.0).await.unwrap();
        repo.log_weight(client, day(20), 77.5).await.unwrap();
        repo.log_weight(Uuid::new_v4(), day(5), 60.0).await.unwrap();

        let history = repo.history(client, day(1), day(15)).await.unwrap();
        let dates: Vec<NaiveDate> = history.iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![day(1), day(10)]);

        let trend = repo.weight_trend(client, day(1), day(31)).await.unwrap().unwrap();
        assert_eq!(trend.latest, 77.5);
        assert_eq!(trend.latest_date, day(20));
        assert!((trend.change() + 2.5).abs() < 1e-9);

        assert!(repo.history(client, day(15), day(1)).await.is_err());
    }

    /// Yields after every read so two callers can both observe "no row yet"
    struct InterleavingBackend {
        inner: MemoryBackend,
    }

    #[async_trait]
    impl Backend for InterleavingBackend {
        async fn select(&self, table: &str, query: &Query) -> DomainResult<Vec<Value>> {
            let rows = self.inner.select(table, query).await?;
            tokio::task::yield_now().await;
            Ok(rows)
        }

        async fn insert(&self, table: &str, rows: Vec<Value>) -> DomainResult<Vec<Value>> {
            self.inner.insert(table, rows).await
        }

        async fn update(&self, table: &str, query: &Query, patch: Value) -> DomainResult<Vec<Value>> {
            self.inner.update(table, query, patch).await
        }

        async fn delete(&self, table: &str, query: &Query) -> DomainResult<()> {
            self.inner.delete(table, query).await
        }
    }

    #[tokio::test]
    async fn test_overlapping_daily_logs_insert_twice() {
        let interleaving = Arc::new(InterleavingBackend { inner: MemoryBackend::new() });
        let backend: SharedBackend = interleaving.clone();
        let repo = ProgressRepository::new(backend);
        let client = Uuid::new_v4();

        let (first, second) = futures::join!(
            repo.log_weight(client, day(7), 80.0),
            repo.log_weight(client, day(7), 80.4)
        );
        assert!(first.is_ok() && second.is_ok());
        // Both read before either wrote: the day ends up with two rows
        assert_eq!(interleaving.inner.rows("progress").len(), 2);
    }

    #[tokio::test]
    async fn test_workout_logs_for_day() {
        let (_, backend) = setup();
        let repo = ProgressRepository::new(backend);
        let client = Uuid::new_v4();
        let exercise = Uuid::new_v4();
        for set in [2, 1] {
            let log = WorkoutLog {
                id: Uuid::new_v4(),
                client_id: client,
                exercise_id: exercise,
                date: day(4),
                set_number: set,
                reps: 10,
                weight_kg: Some(60.0),
                notes: None,
            };
            repo.log_set(&log).await.unwrap();
        }

        let logs = repo.logs_for_day(client, day(4)).await.unwrap();
        let sets: Vec<i32> = logs.iter().map(|l| l.set_number).collect();
        assert_eq!(sets, vec![1, 2]);
        assert!(repo.logs_for_day(client, day(5)).await.unwrap().is_empty());

        repo.delete_log(logs[0].id).await.unwrap();
        assert_eq!(repo.recent_logs_for_exercise(client, exercise, 5).await.unwrap().len(), 1);
    }

    // ========================
    // Photos
    // ========================

    #[tokio::test]
    async fn test_photo_upload_pair_and_delete() {
        let (memory, backend) = setup();
        let storage = Arc::new(MemoryStorage::new());
        let shared_storage: SharedStorage = storage.clone();
        let repo = PhotoRepository::new(backend, shared_storage);
        let client = Uuid::new_v4();

        let early = repo.upload(client, day(1), PhotoPose::Front, "IMG_1.JPG", vec![1]).await.unwrap();
        let late = repo.upload(client, day(28), PhotoPose::Front, "IMG_2.jpg", vec![2]).await.unwrap();
        repo.upload(client, day(14), PhotoPose::Side, "IMG_3.png", vec![3]).await.unwrap();

        assert_eq!(storage.len(), 3);
        assert!(early.storage_path.starts_with(&format!("{}/2024-05-01_front_", client)));
        assert!(early.storage_path.ends_with(".jpg"));
        assert_eq!(storage.content_type(&early.storage_path).as_deref(), Some("image/jpeg"));

        let pair = repo.before_after(client, PhotoPose::Front).await.unwrap().expect("pair");
        assert_eq!(pair.before.id, early.id);
        assert_eq!(pair.after.id, late.id);
        assert!(repo.before_after(client, PhotoPose::Side).await.unwrap().is_none());

        repo.delete(&early).await.unwrap();
        assert!(!storage.contains(&early.storage_path));
        assert_eq!(memory.rows("progress_photos").len(), 2);
    }

    #[tokio::test]
    async fn test_photo_row_failure_removes_object() {
        let (memory, backend) = setup();
        let storage = Arc::new(MemoryStorage::new());
        let shared_storage: SharedStorage = storage.clone();
        let repo = PhotoRepository::new(backend, shared_storage);
        memory.fail_inserts_into("progress_photos", DomainError::Network("offline".to_string()));

        let result = repo.upload(Uuid::new_v4(), day(1), PhotoPose::Back, "b.jpg", vec![1]).await;
        assert!(result.is_err());
        assert!(storage.is_empty());
    }

    // ========================
    // Guidelines
    // ========================

    #[tokio::test]
    async fn test_guidelines_stay_contiguous() {
        let (_, backend) = setup();
        let repo = GuidelineRepository::new(backend);
        let water = repo.create("Agua", "2 litros").await.unwrap();
        let sleep = repo.create("Sueño", "8 horas").await.unwrap();
        let steps = repo.create("Pasos", "10.000 al día").await.unwrap();
        assert_eq!(steps.order_index, 2);

        repo.delete(sleep.id).await.unwrap();
        let remaining = repo.list_all().await.unwrap();
        let order: Vec<(Uuid, i32)> = remaining.iter().map(|g| (g.id, g.order_index)).collect();
        assert_eq!(order, vec![(water.id, 0), (steps.id, 1)]);

        repo.move_guideline(1, 0).await.unwrap();
        let titles: Vec<String> = repo.list_all().await.unwrap().into_iter().map(|g| g.title).collect();
        assert_eq!(titles, vec!["Pasos", "Agua"]);
    }

    #[tokio::test]
    async fn test_guidelines_published_only() {
        let (_, backend) = setup();
        let repo = GuidelineRepository::new(backend);
        let mut draft = repo.create("Borrador", "").await.unwrap();
        repo.create("Publicada", "texto").await.unwrap();
        draft.published = false;
        repo.update(&draft).await.unwrap();

        let visible = repo.list_published().await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "Publicada");
        assert!(repo.create("   ", "x").await.is_err());
        assert!(repo.reorder(&[draft.id]).await.is_err());
    }
}

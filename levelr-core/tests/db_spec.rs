use speculate2::speculate;

speculate! {
    use levelr_core::models::*;
    use levelr_core::plan::placeholder_levels;
    use levelr_core::progression::{self, ProgressionError};
    use levelr_core::rewards::{Reward, COMPLETION_BONUS};
    use levelr_core::{Database, GoalUpdateError};
    use uuid::Uuid;

    fn setup_db() -> Database {
        let db = Database::open_memory().expect("Failed to create test database");
        db.migrate().expect("Failed to migrate");
        db
    }

    fn create_test_user(db: &Database, email: &str) -> User {
        db.create_user(RegisterInput {
            username: "player".into(),
            email: email.into(),
            password: "hunter22".into(),
        })
        .expect("Failed to create user")
    }

    fn create_test_goal(db: &Database, user: &User, levels: u32) -> Goal {
        let goal = progression::new_goal(
            user.id,
            "Ship a side project",
            GoalCategory::Projects,
            Difficulty::Medium,
            placeholder_levels(levels, Difficulty::Medium),
        );
        db.upsert_goal(&goal).expect("Failed to save goal");
        goal
    }

    describe "users" {
        it "finds users by credentials" {
            let db = setup_db();
            let user = create_test_user(&db, "a@example.com");

            let found = db.find_user_by_credentials("a@example.com", "hunter22").unwrap();
            assert_eq!(found.map(|u| u.id), Some(user.id));
        }

        it "returns nothing for a wrong password or unknown email" {
            let db = setup_db();
            create_test_user(&db, "a@example.com");

            assert!(db.find_user_by_credentials("a@example.com", "nope").unwrap().is_none());
            assert!(db.find_user_by_credentials("b@example.com", "hunter22").unwrap().is_none());
        }

        it "rejects a duplicate email" {
            let db = setup_db();
            create_test_user(&db, "a@example.com");
            let dup = db.create_user(RegisterInput {
                username: "other".into(),
                email: "a@example.com".into(),
                password: "x".into(),
            });
            assert!(dup.is_err());
        }

        it "applies partial updates" {
            let db = setup_db();
            let user = create_test_user(&db, "a@example.com");

            let updated = db
                .update_user(user.id, UpdateUserInput {
                    password: Some("newpass1".into()),
                    ..Default::default()
                })
                .unwrap()
                .unwrap();

            assert_eq!(updated.username, "player");
            assert!(db.find_user_by_credentials("a@example.com", "newpass1").unwrap().is_some());
            assert!(db.update_user(Uuid::new_v4(), UpdateUserInput::default()).unwrap().is_none());
        }

        it "trims an updated email so the user can still log in" {
            let db = setup_db();
            let user = create_test_user(&db, "a@example.com");

            let updated = db
                .update_user(user.id, UpdateUserInput {
                    email: Some("  b@example.com ".into()),
                    ..Default::default()
                })
                .unwrap()
                .unwrap();

            assert_eq!(updated.email, "b@example.com");
            assert!(db.find_user_by_credentials("b@example.com", "hunter22").unwrap().is_some());
        }

        it "adds rewards to stats" {
            let db = setup_db();
            let user = create_test_user(&db, "a@example.com");

            assert!(db.add_rewards(user.id, Reward::new(40, 7), 1).unwrap());
            let stats = db.get_user(user.id).unwrap().unwrap().stats;
            assert_eq!(stats, UserStats { xp: 40, coins: 7, completed_quests: 1 });
        }
    }

    describe "goals" {
        it "stores and reloads a goal document" {
            let db = setup_db();
            let user = create_test_user(&db, "a@example.com");
            let goal = create_test_goal(&db, &user, 5);

            let loaded = db.get_goal(goal.id).unwrap().unwrap();
            assert_eq!(loaded.levels, goal.levels);
            assert_eq!(loaded.difficulty, Difficulty::Medium);
        }

        it "lists only goals owned by the user" {
            let db = setup_db();
            let alice = create_test_user(&db, "alice@example.com");
            let bob = create_test_user(&db, "bob@example.com");
            create_test_goal(&db, &alice, 3);
            create_test_goal(&db, &alice, 3);
            create_test_goal(&db, &bob, 3);

            assert_eq!(db.list_goals(alice.id).unwrap().len(), 2);
            assert_eq!(db.list_goals(bob.id).unwrap().len(), 1);
        }

        it "replaces on upsert and deletes" {
            let db = setup_db();
            let user = create_test_user(&db, "a@example.com");
            let mut goal = create_test_goal(&db, &user, 3);

            goal.title = "Renamed".into();
            db.upsert_goal(&goal).unwrap();
            assert_eq!(db.get_goal(goal.id).unwrap().unwrap().title, "Renamed");

            assert!(db.delete_goal(goal.id).unwrap());
            assert!(!db.delete_goal(goal.id).unwrap());
            assert!(db.get_goal(goal.id).unwrap().is_none());
        }

        it "persists to disk" {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("nested").join("levelr.db");

            let user_id = {
                let db = Database::open(&path).unwrap();
                db.migrate().unwrap();
                create_test_user(&db, "a@example.com").id
            };

            let db = Database::open(&path).unwrap();
            db.migrate().unwrap();
            assert!(db.get_user(user_id).unwrap().is_some());
        }
    }

    describe "complete_level" {
        it "advances the goal and credits the user together" {
            let db = setup_db();
            let user = create_test_user(&db, "a@example.com");
            let goal = create_test_goal(&db, &user, 4);

            let outcome = db.complete_level(goal.id, 1).unwrap();

            assert_eq!(outcome.goal.progress, 25);
            assert_eq!(outcome.user.stats.xp, 100);
            assert_eq!(outcome.user.stats.coins, 25);
            assert_eq!(db.get_goal(goal.id).unwrap().unwrap().current_level, 2);
        }

        it "pays the completion bonus on the final level" {
            let db = setup_db();
            let user = create_test_user(&db, "a@example.com");
            let goal = create_test_goal(&db, &user, 2);

            db.complete_level(goal.id, 1).unwrap();
            let outcome = db.complete_level(goal.id, 2).unwrap();

            assert!(outcome.goal.is_completed);
            assert_eq!(outcome.goal.progress, 100);
            let expected_xp = 100 + 110 + COMPLETION_BONUS.xp as u64;
            let expected_coins = 25 + 30 + COMPLETION_BONUS.coins as u64;
            assert_eq!(outcome.user.stats.xp, expected_xp);
            assert_eq!(outcome.user.stats.coins, expected_coins);
            assert_eq!(outcome.user.stats.completed_quests, 1);
        }

        it "leaves everything unchanged when the level is locked" {
            let db = setup_db();
            let user = create_test_user(&db, "a@example.com");
            let goal = create_test_goal(&db, &user, 3);

            let err = db.complete_level(goal.id, 3).unwrap_err();
            assert!(matches!(err, GoalUpdateError::Progression(ProgressionError::LevelLocked(3))));
            assert_eq!(db.get_goal(goal.id).unwrap().unwrap(), goal);
            assert_eq!(db.get_user(user.id).unwrap().unwrap().stats.xp, 0);
        }

        it "saturates oversized stored rewards without poisoning the store" {
            let db = setup_db();
            let user = create_test_user(&db, "a@example.com");
            let mut goal = create_test_goal(&db, &user, 2);
            goal.levels[1].xp_reward = u32::MAX;
            db.upsert_goal(&goal).unwrap();

            db.complete_level(goal.id, 1).unwrap();
            let outcome = db.complete_level(goal.id, 2).unwrap();

            assert_eq!(outcome.reward.reward.xp, u32::MAX);
            assert!(outcome.goal.is_completed);
            let stats = db.get_user(user.id).unwrap().unwrap().stats;
            assert_eq!(stats.xp, 100 + u32::MAX as u64);
        }

        it "reports a missing goal" {
            let db = setup_db();
            let err = db.complete_level(Uuid::new_v4(), 1).unwrap_err();
            assert!(matches!(err, GoalUpdateError::GoalNotFound));
        }
    }

    describe "toggle_task" {
        it "persists the checklist" {
            let db = setup_db();
            let user = create_test_user(&db, "a@example.com");
            let mut goal = create_test_goal(&db, &user, 2);
            goal.levels[0].tasks = vec!["read".into(), "write".into()];
            goal.levels[0].completed_tasks = vec![false, false];
            db.upsert_goal(&goal).unwrap();

            let updated = db.toggle_task(goal.id, 1, 0).unwrap();
            assert_eq!(updated.levels[0].completed_tasks, vec![true, false]);
            let stored = db.get_goal(goal.id).unwrap().unwrap();
            assert_eq!(stored.levels[0].completed_tasks, vec![true, false]);
        }
    }
}

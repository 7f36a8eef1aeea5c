use speculate2::speculate;

speculate! {
    use levelr_core::models::*;
    use levelr_core::plan::{build_levels, placeholder_levels, LevelDraft};
    use levelr_core::progression::{self, check_progression, ProgressionError};
    use levelr_core::rewards::{Reward, COMPLETION_BONUS};
    use uuid::Uuid;

    fn goal_with(n: u32, difficulty: Difficulty) -> Goal {
        progression::new_goal(
            Uuid::new_v4(),
            "Learn Spanish",
            GoalCategory::Study,
            difficulty,
            placeholder_levels(n, difficulty),
        )
    }

    fn statuses(goal: &Goal) -> Vec<LevelStatus> {
        goal.levels.iter().map(|l| l.status).collect()
    }

    describe "complete_level" {
        it "completes the level and unlocks the next one" {
            let mut goal = goal_with(5, Difficulty::Medium);

            let done = progression::complete_level(&mut goal, 1).unwrap();

            assert_eq!(
                statuses(&goal),
                vec![
                    LevelStatus::Completed,
                    LevelStatus::Unlocked,
                    LevelStatus::Locked,
                    LevelStatus::Locked,
                    LevelStatus::Locked,
                ]
            );
            assert_eq!(goal.progress, 20);
            assert_eq!(goal.current_level, 2);
            assert!(!goal.is_completed);
            assert_eq!(done.reward, Reward::new(100, 25));
            assert!(!done.quest_completed);
        }

        it "sets rounded progress for every intermediate level" {
            let n = 7;
            let mut goal = goal_with(n, Difficulty::Easy);

            for k in 1..n {
                progression::complete_level(&mut goal, k).unwrap();
                let expected = ((100.0 * k as f64) / n as f64).round() as u8;
                assert_eq!(goal.progress, expected, "after level {}", k);
                assert_eq!(goal.level(k).unwrap().status, LevelStatus::Completed);
                assert_eq!(goal.level(k + 1).unwrap().status, LevelStatus::Unlocked);
                assert!(check_progression(&goal).is_ok());
            }
        }

        it "finishes the goal on the last level and pays the bonus" {
            let mut goal = goal_with(3, Difficulty::Hard);
            progression::complete_level(&mut goal, 1).unwrap();
            progression::complete_level(&mut goal, 2).unwrap();

            let done = progression::complete_level(&mut goal, 3).unwrap();

            assert!(goal.is_completed);
            assert_eq!(goal.progress, 100);
            assert_eq!(goal.current_level, 3);
            assert!(goal.levels.iter().all(|l| l.status == LevelStatus::Completed));
            assert!(done.quest_completed);
            assert_eq!(done.reward, Reward::new(170, 60) + COMPLETION_BONUS);
            assert!(check_progression(&goal).is_ok());
        }

        it "rejects a locked level" {
            let mut goal = goal_with(3, Difficulty::Easy);
            let err = progression::complete_level(&mut goal, 2).unwrap_err();
            assert_eq!(err, ProgressionError::LevelLocked(2));
            assert_eq!(goal.progress, 0);
        }

        it "rejects completing the same level twice" {
            let mut goal = goal_with(3, Difficulty::Easy);
            progression::complete_level(&mut goal, 1).unwrap();
            let err = progression::complete_level(&mut goal, 1).unwrap_err();
            assert_eq!(err, ProgressionError::AlreadyCompleted(1));
        }

        it "rejects an unknown level" {
            let mut goal = goal_with(2, Difficulty::Easy);
            let err = progression::complete_level(&mut goal, 9).unwrap_err();
            assert_eq!(err, ProgressionError::LevelNotFound(9));
        }

        it "completes a goal with one level immediately" {
            let mut goal = goal_with(1, Difficulty::Easy);
            let done = progression::complete_level(&mut goal, 1).unwrap();
            assert!(goal.is_completed);
            assert_eq!(done.reward, Reward::new(550, 210));
        }
    }

    describe "toggle_task" {
        it "flips entries of an unlocked level" {
            let drafts = vec![LevelDraft {
                title: "Warm up".into(),
                tasks: vec!["stretch".into(), "jog".into(), "cool down".into()],
                ..Default::default()
            }];
            let levels = build_levels(drafts, Difficulty::Easy, 1);
            let mut goal = progression::new_goal(
                Uuid::new_v4(), "Run", GoalCategory::Fitness, Difficulty::Easy, levels,
            );

            assert_eq!(progression::toggle_task(&mut goal, 1, 2), Ok(true));
            assert_eq!(goal.levels[0].completed_tasks, vec![false, false, true]);
        }

        it "rejects an index past the task list" {
            let mut goal = goal_with(2, Difficulty::Easy);
            let err = progression::toggle_task(&mut goal, 1, 0).unwrap_err();
            assert_eq!(err, ProgressionError::TaskOutOfRange { level: 1, index: 0, len: 0 });
        }
    }
}

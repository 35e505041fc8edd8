//! 编排集成测试：多 agent 场景、并发领取、重置

use std::collections::HashSet;
use std::sync::{Arc, Barrier};

use hive::core::OrchestrationError;
use hive::orchestration::{Orchestration, TaskSpec, TaskStatus};
use serde_json::json;

#[test]
fn test_end_to_end_scenario() {
    let orch = Orchestration::default();

    orch.register_agent("A", "x", vec!["c1".to_string()]).unwrap();
    orch.share_knowledge("k", r#"{"v":1}"#, Some("A"), None).unwrap();
    orch.register_agent("B", "x", Vec::new()).unwrap();

    let atoms = orch.query_knowledge(Some("k"), None, 10);
    assert_eq!(atoms.len(), 1);
    assert_eq!(atoms[0].source_agent.as_deref(), Some("A"));
    assert_eq!(atoms[0].access_count, 1);
    assert_eq!(atoms[0].content, json!({"v": 1}));

    let task = orch
        .create_workflow_task(TaskSpec::new("t", "{}").with_priority(5))
        .unwrap();
    let claimed = orch.claim_workflow_task("B", None).unwrap();
    assert_eq!(claimed.task_id, task.task_id);
    assert_eq!(claimed.status, TaskStatus::Claimed);
    assert_eq!(claimed.claimed_by.as_deref(), Some("B"));

    orch.complete_workflow_task(&task.task_id, r#"{"ok":true}"#, true)
        .unwrap();

    let completed = orch.list_workflow_tasks(Some(TaskStatus::Completed), None);
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].task_id, task.task_id);
    assert_eq!(completed[0].result, Some(json!({"ok": true})));

    let b = orch
        .list_active_agents()
        .into_iter()
        .find(|a| a.session.id == "B")
        .unwrap();
    assert_eq!(b.session.task_count, 1);
}

#[test]
fn test_idempotent_registration() {
    let orch = Orchestration::default();
    let (first, _) = orch.register_agent("A", "cursor", Vec::new()).unwrap();
    let (second, _) = orch.register_agent("A", "cursor", Vec::new()).unwrap();

    let agents = orch.list_active_agents();
    assert_eq!(agents.len(), 1);
    assert_eq!(second.created_at, first.created_at);
    assert!(second.last_active_at >= first.last_active_at);
}

#[test]
fn test_deregistration_then_listing() {
    let orch = Orchestration::default();
    orch.register_agent("A", "cursor", Vec::new()).unwrap();
    orch.register_agent("B", "windsurf", Vec::new()).unwrap();

    orch.deregister_agent("A").unwrap();
    let ids: Vec<_> = orch
        .list_active_agents()
        .into_iter()
        .map(|a| a.session.id)
        .collect();
    assert_eq!(ids, vec!["B"]);

    let status = orch.status();
    assert_eq!(status.active_agents, 1);
    assert_eq!(status.total_agents, 2);

    assert_eq!(
        orch.deregister_agent("A").unwrap_err(),
        OrchestrationError::AgentNotFound("A".to_string())
    );
}

#[test]
fn test_dangling_source_agent_is_queryable() {
    let orch = Orchestration::default();
    orch.register_agent("A", "cursor", Vec::new()).unwrap();
    orch.share_knowledge("actor", json!({"name": "Cube"}), Some("A"), None)
        .unwrap();
    orch.deregister_agent("A").unwrap();

    let atoms = orch.query_knowledge(None, Some("A"), 10);
    assert_eq!(atoms.len(), 1);
    assert_eq!(atoms[0].source_agent.as_deref(), Some("A"));
}

#[test]
fn test_priority_order_then_fifo() {
    let orch = Orchestration::default();
    for priority in [10, 5, 1] {
        orch.create_workflow_task(TaskSpec::new("t", json!({ "p": priority })).with_priority(priority))
            .unwrap();
    }
    let first_equal = orch
        .create_workflow_task(TaskSpec::new("t", json!({})).with_priority(0))
        .unwrap();
    let second_equal = orch
        .create_workflow_task(TaskSpec::new("t", json!({})).with_priority(0))
        .unwrap();

    let claimed: Vec<_> = (0..5)
        .map(|_| orch.claim_workflow_task("A", None).unwrap())
        .collect();
    let priorities: Vec<_> = claimed.iter().map(|t| t.priority).collect();
    assert_eq!(priorities, vec![10, 5, 1, 0, 0]);
    assert_eq!(claimed[3].task_id, first_equal.task_id);
    assert_eq!(claimed[4].task_id, second_equal.task_id);

    assert!(matches!(
        orch.claim_workflow_task("A", None),
        Err(OrchestrationError::NoAvailableTask(_))
    ));
}

#[test]
fn test_forward_only_transitions() {
    let orch = Orchestration::default();
    let task = orch.create_workflow_task(TaskSpec::new("t", "{}")).unwrap();

    assert!(matches!(
        orch.complete_workflow_task(&task.task_id, "{}", true),
        Err(OrchestrationError::InvalidState { .. })
    ));

    orch.claim_workflow_task("A", Some(&task.task_id)).unwrap();
    orch.complete_workflow_task(&task.task_id, "{}", true).unwrap();

    assert!(matches!(
        orch.complete_workflow_task(&task.task_id, "{}", false),
        Err(OrchestrationError::InvalidState { .. })
    ));
    assert_eq!(orch.status().completed_tasks, 1);
    assert_eq!(orch.status().failed_tasks, 0);
}

#[test]
fn test_query_side_effect_counts_returns() {
    let orch = Orchestration::default();
    let atom = orch.share_knowledge("k", "{}", None, None).unwrap();
    orch.share_knowledge("other", "{}", None, None).unwrap();

    for _ in 0..3 {
        orch.query_knowledge(Some("k"), None, 10);
    }
    // limit=1 只返回最新的 "other"
    orch.query_knowledge(None, None, 1);

    let atoms = orch.query_knowledge(Some("k"), None, 10);
    assert_eq!(atoms[0].atom_id, atom.atom_id);
    assert_eq!(atoms[0].access_count, 4);
}

#[test]
fn test_full_reset_completeness() {
    let orch = Orchestration::default();
    orch.register_agent("A", "cursor", Vec::new()).unwrap();
    orch.share_knowledge("k", "{}", Some("A"), None).unwrap();
    let task = orch.create_workflow_task(TaskSpec::new("t", "{}")).unwrap();
    orch.claim_workflow_task("A", None).unwrap();
    orch.complete_workflow_task(&task.task_id, "{}", true).unwrap();
    orch.create_workflow_task(TaskSpec::new("t", "{}")).unwrap();

    orch.reset(true).unwrap();

    assert!(orch.status().is_empty());
    assert!(orch.list_active_agents().is_empty());
    assert!(orch.query_knowledge(None, None, 100).is_empty());
    assert!(orch.list_workflow_tasks(None, None).is_empty());
    assert!(orch.workflow_history(100).is_empty());
    assert!(matches!(
        orch.claim_workflow_task("A", Some(&task.task_id)),
        Err(OrchestrationError::TaskNotFound(_))
    ));

    // 重置后新生成的 id 不与旧的冲突
    let fresh = orch.create_workflow_task(TaskSpec::new("t", "{}")).unwrap();
    assert_ne!(fresh.task_id, task.task_id);
}

#[test]
fn test_concurrent_claims_by_id_exactly_one_wins() {
    let orch = Arc::new(Orchestration::default());
    let task = orch.create_workflow_task(TaskSpec::new("t", "{}")).unwrap();

    let threads = 16;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|i| {
            let orch = Arc::clone(&orch);
            let barrier = Arc::clone(&barrier);
            let task_id = task.task_id.clone();
            std::thread::spawn(move || {
                barrier.wait();
                orch.claim_workflow_task(&format!("agent-{i}"), Some(&task_id))
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, OrchestrationError::InvalidState { .. })));
}

#[test]
fn test_concurrent_auto_claims_never_share_a_task() {
    let orch = Arc::new(Orchestration::default());
    let tasks = 40;
    for i in 0..tasks {
        orch.create_workflow_task(TaskSpec::new("t", json!({ "i": i })).with_priority(i % 4))
            .unwrap();
    }

    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|i| {
            let orch = Arc::clone(&orch);
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                barrier.wait();
                let mut claimed = Vec::new();
                while let Ok(task) = orch.claim_workflow_task(&format!("agent-{i}"), None) {
                    claimed.push(task.task_id);
                }
                claimed
            })
        })
        .collect();

    let mut seen = HashSet::new();
    for handle in handles {
        for task_id in handle.join().unwrap() {
            assert!(seen.insert(task_id), "task claimed twice");
        }
    }
    assert_eq!(seen.len(), tasks as usize);

    let status = orch.status();
    assert_eq!(status.pending_tasks, 0);
    assert_eq!(status.claimed_tasks, tasks as usize);
}

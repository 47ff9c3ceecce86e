use serde::Serialize;

/// One procedural stage of a case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageMeta {
    pub key: &'static str,
    pub label: &'static str,
    pub order: u32,
    pub color: &'static str,
}

const fn stage(key: &'static str, label: &'static str, order: u32, color: &'static str) -> StageMeta {
    StageMeta { key, label, order, color }
}

/// Stages in progression order, intake to closed
pub const CASE_STAGES: [StageMeta; 11] = [
    stage("intake", "Intake", 10, "slate"),
    stage("prepare_complaint", "Prepare Complaint", 20, "indigo"),
    stage("file_complaint", "File Complaint", 30, "blue"),
    stage("serve_summons", "Serve Summons", 40, "cyan"),
    stage("await_answer", "Await Answer", 50, "amber"),
    stage("discovery", "Discovery", 60, "yellow"),
    stage("pre_trial", "Pre-trial", 70, "purple"),
    stage("trial", "Trial", 80, "red"),
    stage("judgment", "Judgment", 90, "emerald"),
    stage("enforcement", "Enforcement", 100, "green"),
    stage("closed", "Closed", 110, "gray"),
];

pub const UNSPECIFIED_LABEL: &str = "Unspecified";

pub fn stage_meta(key: Option<&str>) -> Option<&'static StageMeta> {
    let key = key.filter(|k| !k.is_empty())?;
    CASE_STAGES.iter().find(|s| s.key == key)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageBadge {
    pub label: &'static str,
    pub color: &'static str,
    pub title: String,
}

pub fn stage_badge(key: Option<&str>) -> StageBadge {
    match stage_meta(key) {
        Some(meta) => StageBadge {
            label: meta.label,
            color: meta.color,
            title: format!("Stage: {}", meta.label),
        },
        None => StageBadge {
            label: UNSPECIFIED_LABEL,
            color: "slate",
            title: "Stage not set".to_string(),
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepState {
    Done,
    Current,
    Pending,
}

impl StepState {
    /// Done and current steps are drawn with emphasis
    pub fn is_emphasized(&self) -> bool {
        !matches!(self, StepState::Pending)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub stage: StageMeta,
    pub state: StepState,
    /// Connector to the next stage; `None` on the last stage
    pub segment_completed: Option<bool>,
}

/// Classify every stage in `stages` against the current stage key. An
/// unknown or missing key leaves every stage pending.
pub fn stepper(stages: &[StageMeta], current: Option<&str>) -> Vec<Step> {
    let current_index = current.and_then(|key| stages.iter().position(|s| s.key == key));
    let last = stages.len().saturating_sub(1);

    stages
        .iter()
        .enumerate()
        .map(|(idx, stage)| {
            let state = match current_index {
                Some(cur) if idx < cur => StepState::Done,
                Some(cur) if idx == cur => StepState::Current,
                _ => StepState::Pending,
            };
            let segment_completed = (idx < last).then(|| current_index.is_some_and(|cur| cur > idx));
            Step {
                stage: *stage,
                state,
                segment_completed,
            }
        })
        .collect()
}

/// One-line rendering for terminals: `✓ Intake ━━ ● Prepare Complaint ── ○ ...`
pub fn render_stepper(steps: &[Step]) -> String {
    let mut out = String::new();
    for step in steps {
        let marker = match step.state {
            StepState::Done => '✓',
            StepState::Current => '●',
            StepState::Pending => '○',
        };
        out.push(marker);
        out.push(' ');
        out.push_str(step.stage.label);
        match step.segment_completed {
            Some(true) => out.push_str(" ━━ "),
            Some(false) => out.push_str(" ── "),
            None => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stages_are_ordered() {
        assert_eq!(CASE_STAGES.len(), 11);
        assert!(CASE_STAGES.windows(2).all(|w| w[0].order < w[1].order));
        assert_eq!(CASE_STAGES[0].key, "intake");
        assert_eq!(CASE_STAGES[10].key, "closed");
    }

    #[test]
    fn test_three_stage_stepper() {
        let stages = &CASE_STAGES[..3];
        let steps = stepper(stages, Some("prepare_complaint"));

        let states: Vec<_> = steps.iter().map(|s| s.state).collect();
        assert_eq!(states, vec![StepState::Done, StepState::Current, StepState::Pending]);

        let completed = steps.iter().filter(|s| s.segment_completed == Some(true)).count();
        assert_eq!(completed, 1);
        assert_eq!(steps[0].segment_completed, Some(true));
        assert_eq!(steps[1].segment_completed, Some(false));
        assert_eq!(steps[2].segment_completed, None);
    }

    #[test]
    fn test_unset_stage_is_all_pending() {
        for key in [None, Some("settlement"), Some("")] {
            let steps = stepper(&CASE_STAGES, key);
            assert!(steps.iter().all(|s| s.state == StepState::Pending));
            assert!(steps.iter().all(|s| s.segment_completed != Some(true)));
        }
        assert_eq!(stage_badge(None).label, UNSPECIFIED_LABEL);
        assert_eq!(stage_badge(Some("settlement")).title, "Stage not set");
    }

    #[test]
    fn test_badge_for_known_stage() {
        let badge = stage_badge(Some("trial"));
        assert_eq!(badge.label, "Trial");
        assert_eq!(badge.title, "Stage: Trial");
    }

    #[test]
    fn test_render_stepper() {
        let steps = stepper(&CASE_STAGES[..3], Some("prepare_complaint"));
        assert_eq!(
            render_stepper(&steps),
            "✓ Intake ━━ ● Prepare Complaint ── ○ File Complaint"
        );
    }
}

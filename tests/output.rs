use substrate_tasks::output::{format_human, HumanOutput};

#[test]
fn format_human_includes_sections() {
    let mut human = HumanOutput::new("Task l/2");
    human.push_summary("Status", "in_progress");
    human.push_line("Blocked by", "l/1 [completed] Design schema");
    human.push_line("Blocks", "9 (not in scope)");
    human.push_warning("1 task(s) with other statuses not shown");

    let rendered = format_human(&human);
    assert!(rendered.starts_with("Task l/2"));
    assert!(rendered.contains("Summary:"));
    assert!(rendered.contains("- Status: in_progress"));
    assert!(rendered.contains("Blocked by:\n- l/1 [completed] Design schema"));
    assert!(rendered.contains("Blocks:\n- 9 (not in scope)"));
    assert!(rendered.contains("Warnings:"));
}

#[test]
fn format_human_omits_empty_sections() {
    let human = HumanOutput::new("Tasks");
    let rendered = format_human(&human);
    assert_eq!(rendered, "Tasks");
}

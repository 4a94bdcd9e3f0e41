use shared::OfficeStatus;

/// Instruction sent to the generation backend for a status change with context.
pub fn prompt_for(status: OfficeStatus, context: &str) -> String {
    let (task, context_label, constraints) = match status {
        OfficeStatus::Available => (
            "Write a short, welcoming phrase in Arabic stating the manager is available.",
            "Context",
            "Keep it under 10 words. Professional and warm.",
        ),
        OfficeStatus::Busy => (
            "Write a polite phrase in Arabic stating the manager is busy and cannot be disturbed right now.",
            "Reason/Context",
            "Keep it under 15 words. Professional, apologetic but firm.",
        ),
        OfficeStatus::Prayer => (
            "Write a short, polite phrase in Arabic stating the manager is at prayer and will return soon.",
            "Context",
            "Keep it under 10 words. Respectful and calm tone.",
        ),
        OfficeStatus::Closed => (
            "Write a short phrase in Arabic stating the office is closed.",
            "Context",
            "Keep it under 10 words. Neutral tone.",
        ),
    };

    format!(
        "You are an assistant for a manager.\n\
         {task}\n\
         {context_label}: \"{context}\"\n\
         Constraints: Output MUST be in Arabic only. No English. {constraints}",
        context = context.trim(),
    )
}

//! Prompt templates for every completion call the kernel makes.

pub fn initial_task_prompt(objective: &str) -> String {
    format!(
        "Generate the very first concrete task to start pursuing the objective: {objective}\n\n\
         Return a concise, actionable task string only."
    )
}

pub fn prediction_prompt(memory_context: &str, objective: &str, task_text: &str) -> String {
    format!(
        "{memory_context}\n\n\
         Predict the expected outcome for this task toward the objective '{objective}'.\n\n\
         Task: {task_text}\n\n\
         Return ONLY a brief string prediction of the result."
    )
}

pub fn critic_prompt(task_text: &str, prediction: &str, result: &str, objective: &str) -> String {
    format!(
        "Evaluate the result against the task and objective.\n\n\
         Task: {task_text}\n\
         Prediction: {prediction}\n\
         Result: {result}\n\
         Objective: {objective}\n\n\
         Return ONLY valid JSON:\n\
         {{\n  \"success\": true/false,\n  \"feedback\": \"brief explanation\"\n}}\n\n\
         Respond with true if the result meaningfully advances the objective."
    )
}

pub fn goal_prompt(objective: &str, result: &str) -> String {
    format!(
        "Did this result achieve the final objective?\n\n\
         Objective: {objective}\n\
         Latest result: {result}\n\n\
         Answer ONLY \"YES\" or \"NO\"."
    )
}

pub fn subtask_prompt(objective: &str, current_task: &str) -> String {
    format!(
        "You are an autonomous agent working toward the objective: \"{objective}\"\n\n\
         Given the completed task: \"{current_task}\"\n\n\
         Generate 0-5 concise subtasks that directly advance the objective.\n\
         If no further subtasks are needed (goal achieved or task complete), return an empty list.\n\
         Stay strictly on-topic; subtasks must align with the objective.\n\n\
         Return ONLY a valid JSON array of strings, e.g.:\n\
         [\"Subtask 1\", \"Subtask 2\"]\n\
         or\n\
         []"
    )
}

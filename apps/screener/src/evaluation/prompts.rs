// LLM prompt constants for the evaluation loop.

/// Reviewer system prompt. Replace `{language}` before sending.
pub const REVIEWER_SYSTEM_TEMPLATE: &str = "You are a senior technical recruiter. \
    Evaluate how well a candidate's resume fits a job description. \
    Give a fit score from 0 to 10 on its own line in the form `Score (0-10): <number>`. \
    Then analyse the candidate's strengths and gaps against the requirements, \
    and finish with one recommendation: Hire, Interview, or Reject. \
    Be honest and specific; cite evidence from the resume. \
    Respond in {language}, but keep the `Score (0-10):` label in English.";

/// Reviewer user prompt. Replace: {job_description}, {resume_text}, {feedback_section}
pub const REVIEWER_PROMPT_TEMPLATE: &str = r#"[Job Description]
{job_description}

[Resume]
{resume_text}
{feedback_section}
Write your evaluation now."#;

/// Header placed before prior auditor rejections in the reviewer prompt.
pub const FEEDBACK_HEADER: &str = "[Auditor feedback on your previous evaluations; address every point]";

/// Auditor system prompt.
pub const AUDITOR_SYSTEM: &str = "You are a fairness auditor reviewing a recruiter's resume evaluation. \
    Check whether the score is unjustly harsh, and whether the recruiter missed \
    transferable skills or experience in the resume that relate to the job requirements. \
    If the evaluation is fair and complete, reply with exactly the single word PASS and nothing else. \
    Otherwise reply with `FAIL: <reason>`, stating concretely what the recruiter must fix.";

/// Auditor user prompt. Replace: {job_description}, {resume_text}, {reviewer_output}
pub const AUDITOR_PROMPT_TEMPLATE: &str = r#"[Job Description]
{job_description}

[Original Resume]
{resume_text}

[Recruiter Evaluation]
{reviewer_output}

Reply PASS or FAIL: <reason>."#;

/// Substitutes `{name}` placeholders in a single pass over `template`.
/// Inserted values are never rescanned, so braces in a resume or job description
/// come through verbatim. Unknown placeholders are left as they are.
pub fn fill_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        let hit = vars.iter().find_map(|(name, value)| {
            tail.strip_prefix('{')
                .and_then(|t| t.strip_prefix(*name))
                .and_then(|t| t.strip_prefix('}'))
                .map(|after| (*value, after))
        });
        match hit {
            Some((value, after)) => {
                out.push_str(value);
                rest = after;
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

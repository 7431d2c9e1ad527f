/// Utilities for pulling structured JSON out of free-form model output

/// Normalise quoting and strip markdown fences from raw model output
pub fn sanitize_raw_output(raw: &str) -> String {
    raw.replace("```json", "")
        .replace("```", "")
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'")
        .trim()
        .to_string()
}

/// Byte range of the first balanced `{...}` object, skipping braces inside strings
pub fn find_object_bounds(text: &str) -> Option<(usize, usize)> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in text[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some((start, start + i + 1));
                }
            }
            _ => {}
        }
    }

    None
}

/// Remove trailing commas before `}` or `]` (invalid but common in LLM outputs)
pub fn remove_trailing_commas(json: &str) -> String {
    let chars: Vec<char> = json.chars().collect();
    let mut result = String::with_capacity(json.len());
    let mut in_string = false;
    let mut escape_next = false;

    for (i, &ch) in chars.iter().enumerate() {
        if escape_next {
            escape_next = false;
            result.push(ch);
            continue;
        }

        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            ',' if !in_string => {
                let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
                if matches!(next, Some('}') | Some(']')) {
                    continue;
                }
            }
            _ => {}
        }

        result.push(ch);
    }

    result
}

fn parses(candidate: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(candidate).is_ok()
}

/// Extract a JSON object from a model response.
/// Tries the text as-is, then the first balanced object, then the same
/// object with trailing commas removed.
pub fn extract_json(text: &str) -> anyhow::Result<String> {
    let trimmed = text.trim();
    if trimmed.starts_with('{') && parses(trimmed) {
        return Ok(trimmed.to_string());
    }

    let sanitized = sanitize_raw_output(text);

    if let Some((start, end)) = find_object_bounds(&sanitized) {
        let candidate = &sanitized[start..end];
        if parses(candidate) {
            return Ok(candidate.to_string());
        }

        let cleaned = remove_trailing_commas(candidate);
        if parses(&cleaned) {
            tracing::debug!("Extracted JSON after removing trailing commas");
            return Ok(cleaned);
        }
    }

    let cleaned = remove_trailing_commas(&sanitized);
    if let Some((start, end)) = find_object_bounds(&cleaned) {
        let candidate = &cleaned[start..end];
        if parses(candidate) {
            return Ok(candidate.to_string());
        }
    }

    anyhow::bail!(
        "Failed to extract valid JSON from response. Text length: {}, Preview (first 300 chars): {}",
        text.len(),
        text.chars().take(300).collect::<String>()
    )
}

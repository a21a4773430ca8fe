use serde::Serialize;

use crate::cli::OutputFormat;

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raw_output_is_compact() {
        let value = json!({"book": "Berakhot", "start": "2a"});
        assert_eq!(render(&value, OutputFormat::Raw).unwrap(), r#"{"book":"Berakhot","start":"2a"}"#);
        assert!(render(&value, OutputFormat::Json).unwrap().contains('\n'));
    }
}

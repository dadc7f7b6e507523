// src/page.rs
//
// The single HTML page: free-text form, correction form, PDF form.

use crate::report::{BaleSlot, HeaderField, Measurement, Report, display_value};
use serde_json::Value;

/// What the page shows after each request.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub user_input: String,
    /// Serialized report, posted back for PDF generation.
    pub json_output: String,
    pub report: Option<Report>,
    /// Shown inline; the rest of the page still renders.
    pub error: Option<String>,
}

const HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Plastic Bale Report</title>
<style>
body { font-family: sans-serif; max-width: 60rem; margin: 2rem auto; }
textarea { width: 100%; }
table { border-collapse: collapse; }
th, td { border: 1px solid #ccc; padding: 0.25rem 0.5rem; }
td input { width: 6rem; }
.error { color: #b00020; }
.percent { color: #555; }
</style>
</head>
<body>
<h1>Plastic Bale Report</h1>
"#;

const TAIL: &str = "</body>\n</html>\n";

pub fn render(ctx: &PageContext) -> String {
    let mut html = String::from(HEAD);

    html.push_str(&format!(
        "<form method=\"post\" action=\"/chat\">\n\
         <label for=\"user_input\">Describe the transaction</label>\n\
         <textarea id=\"user_input\" name=\"user_input\" rows=\"6\">{}</textarea>\n\
         <button type=\"submit\">Extract</button>\n\
         </form>\n",
        escape(&ctx.user_input)
    ));

    if let Some(error) = &ctx.error {
        html.push_str(&format!("<p class=\"error\">{}</p>\n", escape(error)));
    }

    if let Some(report) = &ctx.report {
        render_correction_form(&mut html, report);
    }

    if !ctx.json_output.is_empty() {
        html.push_str(&format!(
            "<form method=\"post\" action=\"/generate-pdf\">\n\
             <label for=\"report_data\">Report JSON</label>\n\
             <textarea id=\"report_data\" name=\"report_data\" rows=\"8\">{}</textarea>\n\
             <button type=\"submit\">Download PDF</button>\n\
             </form>\n",
            escape(&ctx.json_output)
        ));
    }

    html.push_str(TAIL);
    html
}

fn render_correction_form(html: &mut String, report: &Report) {
    html.push_str("<form method=\"post\" action=\"/update-json\">\n<h2>Review</h2>\n");

    for field in HeaderField::ALL {
        let value = report.get(field.key()).map(display_value).unwrap_or_default();
        let kind = if field == HeaderField::BillNumber {
            "number"
        } else {
            "text"
        };
        html.push_str(&format!(
            "<p><label>{} <input type=\"{kind}\" name=\"{}\" value=\"{}\" required></label></p>\n",
            field.label(),
            field.key(),
            escape(&value)
        ));
    }

    html.push_str("<table>\n<tr><th>Item</th>");
    for slot in BaleSlot::ALL {
        html.push_str(&format!("<th>{0}</th><th>{0} %</th>", slot.label()));
    }
    html.push_str("</tr>\n");

    for m in Measurement::ALL {
        html.push_str(&format!("<tr><td>{}</td>", m.label()));
        for slot in BaleSlot::ALL {
            let bale = report.bale(slot);
            let value = bale
                .and_then(|b| b.get(m.key()))
                .map(display_value)
                .unwrap_or_default();
            let percent = bale
                .filter(|_| m.is_contaminant())
                .and_then(|b| b.get(&m.percent_key()))
                .and_then(Value::as_f64)
                .map(|p| format!("{p:.2}"))
                .unwrap_or_default();
            html.push_str(&format!(
                "<td><input type=\"number\" step=\"any\" name=\"{}_{}\" value=\"{}\"></td>\
                 <td class=\"percent\">{}</td>",
                slot.key(),
                m.key(),
                escape(&value),
                percent
            ));
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</table>\n<button type=\"submit\">Update</button>\n</form>\n");
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::NormalizedReport;
    use serde_json::json;

    fn report() -> NormalizedReport {
        let map = json!({
            "party_name": "Acme & Sons",
            "vehicle": "KA-01",
            "date": "12/03/2025",
            "bill_number": 42,
            "bales": {
                "bale1": {"bale_weight": 100.0, "pvc": 20.0, "pvc_percent": 20.0},
                "bale2": {"bale_weight": 0.0}
            }
        });
        NormalizedReport::new(Report::from(map.as_object().unwrap().clone()))
    }

    #[test]
    fn test_empty_page() {
        let html = render(&PageContext::default());
        assert!(html.contains("action=\"/chat\""));
        assert!(!html.contains("action=\"/update-json\""));
        assert!(!html.contains("action=\"/generate-pdf\""));
    }

    #[test]
    fn test_full_page() {
        let normalized = report();
        let html = render(&PageContext {
            user_input: "<notes>".to_string(),
            json_output: normalized.json.clone(),
            report: Some(normalized.report),
            error: Some("Completion API error: rate limited".to_string()),
        });

        assert!(html.contains("&lt;notes&gt;"));
        assert!(html.contains("value=\"Acme &amp; Sons\""));
        assert!(html.contains("name=\"bill_number\" value=\"42\""));
        assert!(html.contains("name=\"bale1_pvc\" value=\"20.0\""));
        assert!(html.contains("<td class=\"percent\">20.00</td>"));
        assert!(html.contains("name=\"bale2_moisture\" value=\"\""));
        assert!(html.contains("<p class=\"error\">Completion API error: rate limited</p>"));
        assert!(html.contains("&quot;party_name&quot;"));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
    }
}

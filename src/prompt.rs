// src/prompt.rs

/// System instruction sent with every extraction request.
pub const SYSTEM_PROMPT: &str = "You are a report assistant for plastic bottle recycling. \
You read notes about bale deliveries and turn them into structured JSON. \
You answer with JSON only.";

/// The exact shape the model is asked to fill in.
const REPORT_SCHEMA: &str = r#"{
  "party_name": "string",
  "vehicle": "string",
  "date": "DD/MM/YYYY",
  "bill_number": int,
  "bales": {
    "bale1": {
      "bale_weight": float,
      "tar_raffiya": float,
      "pvc": float,
      "non_pet": float,
      "non_food": float,
      "metal": float,
      "colour": float,
      "big_jar": float,
      "big_jar_mix": float,
      "d_grade": float,
      "dirty_bottle": float,
      "moisture": float
    },
    "bale2": {
      "bale_weight": float,
      "tar_raffiya": float,
      "pvc": float,
      "non_pet": float,
      "non_food": float,
      "metal": float,
      "colour": float,
      "big_jar": float,
      "big_jar_mix": float,
      "d_grade": float,
      "dirty_bottle": float,
      "moisture": float
    }
  }
}"#;

/// Build the user instruction asking the model to extract a report from
/// free-form notes.
pub fn build_extraction_prompt(user_input: &str) -> String {
    format!(
        "Given this free-form input:\n\n\
         \"\"\"{user_input}\"\"\"\n\n\
         Extract the following fields and return JSON in **this exact format**:\n\n\
         {REPORT_SCHEMA}\n\n\
         Only return valid JSON - no extra text, comments, or explanations.\n\
         If any value is missing, set it to 0.0.\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{BaleSlot, HeaderField, Measurement};

    #[test]
    fn test_prompt_embeds_input_and_schema() {
        let prompt = build_extraction_prompt("Acme, truck KA-01, bale 1 weighs 512kg");

        assert!(prompt.contains("\"\"\"Acme, truck KA-01, bale 1 weighs 512kg\"\"\""));
        assert!(prompt.contains("set it to 0.0"));
        for field in HeaderField::ALL {
            assert!(prompt.contains(field.key()));
        }
        for slot in BaleSlot::ALL {
            assert!(prompt.contains(slot.key()));
        }
        for m in Measurement::ALL {
            assert!(prompt.contains(&format!("\"{}\": float", m.key())));
        }
    }
}

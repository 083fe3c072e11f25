use aws_sdk_dynamodb::types::AttributeValue;
use model::{StudentUpdate, STUDENT_ID};
use std::collections::HashMap;

/// An `UpdateItem` expression setting only the supplied fields of an existing item.
///
/// Attribute names always go through placeholders as `name` is a reserved word.
pub(crate) struct UpdateExpression {
    pub(crate) update_expression: String,
    pub(crate) condition_expression: String,
    pub(crate) names: HashMap<String, String>,
    pub(crate) values: HashMap<String, AttributeValue>,
}

impl UpdateExpression {
    pub(crate) fn from_update(update: &StudentUpdate) -> Self {
        let mut names: HashMap<String, String> = HashMap::new();
        let mut values: HashMap<String, AttributeValue> = HashMap::new();
        let mut assignments: Vec<String> = Vec::new();

        for (attribute, value) in update.fields() {
            let name_placeholder: String = format!("#{attribute}");
            let value_placeholder: String = format!(":{attribute}");

            assignments.push(format!("{name_placeholder} = {value_placeholder}"));
            names.insert(name_placeholder, attribute.to_string());
            values.insert(value_placeholder, AttributeValue::S(value.to_string()));
        }

        let key_placeholder: String = format!("#{STUDENT_ID}");
        let condition_expression: String = format!("attribute_exists({key_placeholder})");
        names.insert(key_placeholder, STUDENT_ID.to_string());

        UpdateExpression {
            update_expression: format!("SET {}", assignments.join(", ")),
            condition_expression,
            names,
            values,
        }
    }
}

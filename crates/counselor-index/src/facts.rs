use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A structured-fact record from the knowledge data directory.
///
/// The source files are loosely-typed JSON with arbitrary optional fields, so
/// each known category carries typed fields plus a flattened extra-field bag,
/// and records with an unrecognized (or missing) `type` tag fall back to
/// [`FactRecord::General`]. Defaulting happens at read time, not at every use
/// site.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FactRecord {
    /// A course offering.
    Course {
        /// Course name as listed in the catalog.
        name: String,
        /// Owning department, when listed.
        #[serde(default)]
        department: Option<String>,
        /// Credit value.
        #[serde(default)]
        credits: Option<f32>,
        /// Prerequisite course names.
        #[serde(default)]
        prerequisites: Vec<String>,
        /// Catalog description.
        #[serde(default)]
        description: Option<String>,
        /// Fields the schema does not model explicitly.
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
    /// A student club or activity.
    Club {
        /// Club name.
        name: String,
        /// Club category (academic, arts, service, ...).
        #[serde(default)]
        category: Option<String>,
        /// Faculty advisors.
        #[serde(default)]
        advisors: Vec<String>,
        /// Regular meeting day.
        #[serde(default)]
        meeting_day: Option<String>,
        /// Meeting location.
        #[serde(default)]
        location: Option<String>,
        /// What the club does.
        #[serde(default)]
        activities: Option<String>,
        /// Fields the schema does not model explicitly.
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
    /// A graduation requirement line item.
    GraduationRequirement {
        /// Subject area the requirement applies to.
        subject: String,
        /// Credits required in that subject.
        #[serde(default)]
        credits_required: Option<f32>,
        /// Clarifying notes.
        #[serde(default)]
        notes: Option<String>,
        /// Fields the schema does not model explicitly.
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
    /// A college or career pathway.
    Pathway {
        /// Pathway name.
        name: String,
        /// Pathway description.
        #[serde(default)]
        description: Option<String>,
        /// Fields the schema does not model explicitly.
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
    /// A scholarship, program, or other student opportunity.
    Opportunity {
        /// Opportunity name.
        name: String,
        /// Opportunity description.
        #[serde(default)]
        description: Option<String>,
        /// Fields the schema does not model explicitly.
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
    /// Any record that does not match a known category.
    General {
        /// The record's fields, verbatim.
        #[serde(flatten)]
        fields: Map<String, Value>,
    },
}

impl FactRecord {
    /// Parse a JSON value into a fact record, falling back to
    /// [`FactRecord::General`] when the `type` tag is unknown or fields do not
    /// match the typed schema.
    pub fn from_value(value: Value) -> Self {
        match serde_json::from_value::<FactRecord>(value.clone()) {
            Ok(record) => record,
            Err(_) => {
                let fields = match value {
                    Value::Object(map) => map,
                    other => {
                        let mut map = Map::new();
                        map.insert("value".to_string(), other);
                        map
                    }
                };
                FactRecord::General { fields }
            }
        }
    }

    /// Render the record as passage text for indexing.
    ///
    /// One labelled line per populated field so that retrieval matches on the
    /// field values, not on JSON punctuation.
    pub fn to_passage_text(&self) -> String {
        let mut lines: Vec<String> = Vec::new();
        match self {
            FactRecord::Course {
                name,
                department,
                credits,
                prerequisites,
                description,
                extra,
            } => {
                lines.push(format!("Course: {name}"));
                if let Some(dept) = department {
                    lines.push(format!("Department: {dept}"));
                }
                if let Some(credits) = credits {
                    lines.push(format!("Credits: {credits}"));
                }
                if !prerequisites.is_empty() {
                    lines.push(format!("Prerequisites: {}", prerequisites.join(", ")));
                }
                if let Some(desc) = description {
                    lines.push(format!("Description: {desc}"));
                }
                push_extra(&mut lines, extra);
            }
            FactRecord::Club {
                name,
                category,
                advisors,
                meeting_day,
                location,
                activities,
                extra,
            } => {
                lines.push(format!("Club: {name}"));
                if let Some(category) = category {
                    lines.push(format!("Category: {category}"));
                }
                if !advisors.is_empty() {
                    lines.push(format!("Advisors: {}", advisors.join(", ")));
                }
                if let Some(day) = meeting_day {
                    lines.push(format!("Meeting day: {day}"));
                }
                if let Some(location) = location {
                    lines.push(format!("Location: {location}"));
                }
                if let Some(activities) = activities {
                    lines.push(format!("Activities: {activities}"));
                }
                push_extra(&mut lines, extra);
            }
            FactRecord::GraduationRequirement {
                subject,
                credits_required,
                notes,
                extra,
            } => {
                lines.push(format!("Graduation requirement: {subject}"));
                if let Some(credits) = credits_required {
                    lines.push(format!("Credits required: {credits}"));
                }
                if let Some(notes) = notes {
                    lines.push(format!("Notes: {notes}"));
                }
                push_extra(&mut lines, extra);
            }
            FactRecord::Pathway {
                name,
                description,
                extra,
            } => {
                lines.push(format!("Pathway: {name}"));
                if let Some(desc) = description {
                    lines.push(format!("Description: {desc}"));
                }
                push_extra(&mut lines, extra);
            }
            FactRecord::Opportunity {
                name,
                description,
                extra,
            } => {
                lines.push(format!("Opportunity: {name}"));
                if let Some(desc) = description {
                    lines.push(format!("Description: {desc}"));
                }
                push_extra(&mut lines, extra);
            }
            FactRecord::General { fields } => {
                push_extra(&mut lines, fields);
            }
        }
        lines.join("\n")
    }
}

fn push_extra(lines: &mut Vec<String>, extra: &Map<String, Value>) {
    for (key, value) in extra {
        let rendered = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        lines.push(format!("{key}: {rendered}"));
    }
}

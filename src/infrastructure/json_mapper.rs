// Mapper to convert domain models to JSON wire types
use crate::application::subquery_resolver::{ResolverSnapshot, ResolverState};
use crate::domain::attribute::{
    Attribute, AttributeGroup, DisplayEntry, Expansion, SubQueryRef,
};
use crate::domain::feature::FeatureMetadata;
use crate::domain::time_series::{DateTimeValue, RawTime, TimeSeries, TimeSeriesGroup};
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureDto {
    pub attributes: GroupDto,
    pub time_series: Option<TimeSeriesGroupDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDto {
    pub name: String,
    pub attributes: Vec<AttributeDto>,
    pub sub_groups: Vec<GroupDto>,
    pub display_order: Vec<String>,
    pub is_collapsed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_query_ref: Option<SubQueryDto>,
}

#[derive(Debug, Serialize)]
pub struct AttributeDto {
    pub name: String,
    pub value: String,
    pub unit: String,
}

#[derive(Debug, Serialize)]
pub struct SubQueryDto {
    pub iri: String,
    pub stack: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesGroupDto {
    pub id: i64,
    pub time_kind: String,
    pub timestamps: Vec<Value>,
    pub raw_times: Vec<Value>,
    pub series: Vec<TimeSeriesDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesDto {
    pub name: String,
    pub unit: String,
    pub values: Vec<f64>,
    pub value_kind: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerDto {
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolving: Option<SubQueryDto>,
    pub active_stack: String,
    pub last_error: Option<String>,
    pub revision: u64,
    pub feature: FeatureDto,
}

pub fn feature_to_json(feature: &FeatureMetadata) -> FeatureDto {
    FeatureDto {
        attributes: group_to_json(&feature.attributes),
        time_series: feature.time_series.as_ref().map(time_series_group_to_json),
    }
}

pub fn snapshot_to_json(snapshot: &ResolverSnapshot) -> ExplorerDto {
    let (state, resolving) = match &snapshot.state {
        ResolverState::Idle => ("idle", None),
        ResolverState::Resolving { target, .. } => (
            "resolving",
            Some(SubQueryDto {
                iri: target.iri.clone(),
                stack: Some(target.stack.clone()),
            }),
        ),
    };

    ExplorerDto {
        state,
        resolving,
        active_stack: snapshot.active_stack.clone(),
        last_error: snapshot.last_error.as_ref().map(ToString::to_string),
        revision: snapshot.revision,
        feature: feature_to_json(&snapshot.tree),
    }
}

pub fn expansion_to_json(expansion: &Expansion) -> Value {
    match expansion {
        Expansion::Local => json!({ "expansion": "local" }),
        Expansion::Subquery(reference) => json!({
            "expansion": "subquery",
            "iri": reference.iri,
            "stack": reference.source,
        }),
    }
}

fn group_to_json(group: &AttributeGroup) -> GroupDto {
    let mut attributes = Vec::with_capacity(group.attributes.len());
    let mut sub_groups = Vec::with_capacity(group.sub_groups.len());
    for entry in group.entries() {
        match entry {
            DisplayEntry::Attribute(attribute) => attributes.push(attribute_to_json(attribute)),
            DisplayEntry::Group(child) => sub_groups.push(group_to_json(child)),
        }
    }

    GroupDto {
        name: group.name.clone(),
        attributes,
        sub_groups,
        display_order: group.display_order.clone(),
        is_collapsed: group.is_collapsed,
        sub_query_ref: group.sub_query_ref.as_ref().map(sub_query_to_json),
    }
}

fn attribute_to_json(attribute: &Attribute) -> AttributeDto {
    AttributeDto {
        name: attribute.name.clone(),
        value: attribute.value.clone(),
        unit: attribute.unit.clone(),
    }
}

fn sub_query_to_json(reference: &SubQueryRef) -> SubQueryDto {
    SubQueryDto {
        iri: reference.iri.clone(),
        stack: reference.source.clone(),
    }
}

fn time_series_group_to_json(group: &TimeSeriesGroup) -> TimeSeriesGroupDto {
    TimeSeriesGroupDto {
        id: group.id,
        time_kind: group.time_kind.label().to_string(),
        timestamps: group.timestamps.iter().map(timestamp_to_json).collect(),
        raw_times: group.raw_times.iter().map(raw_time_to_json).collect(),
        series: group.series.iter().map(series_to_json).collect(),
    }
}

fn series_to_json(series: &TimeSeries) -> TimeSeriesDto {
    TimeSeriesDto {
        name: series.name.clone(),
        unit: series.unit.clone(),
        values: series.values.clone(),
        value_kind: series.value_kind.clone(),
    }
}

fn timestamp_to_json(timestamp: &DateTimeValue) -> Value {
    match timestamp {
        DateTimeValue::Instant(instant) => json!(instant.to_rfc3339()),
        DateTimeValue::DateTime(naive) => json!(naive.format("%Y-%m-%dT%H:%M:%S").to_string()),
        DateTimeValue::TimeOfDay(time) => json!(time.format("%H:%M:%S").to_string()),
        DateTimeValue::Ticks(ticks) => json!(ticks),
        DateTimeValue::Raw(text) => json!(text),
    }
}

fn raw_time_to_json(raw: &RawTime) -> Value {
    match raw {
        RawTime::Number(n) => json!(n),
        RawTime::Text(text) => json!(text),
    }
}

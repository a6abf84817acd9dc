//! Built-in resource tables
//!
//! Each table here is a [`ResourceTable`] over one PagerDuty collection.
//! Tables whose listing walks a parent collection live in
//! [`super::nested`].

use super::resource::{Hydration, Hydrator, ResourceTable};
use super::types::{ColumnDef, HydrationPolicy};
use crate::filter::{FilterMapping, FilterTarget, INCIDENT_LOOKBACK_DAYS};

const NULL_ON_NOT_FOUND: HydrationPolicy = HydrationPolicy::NullOnNotFound;

// ============================================================================
// Business services
// ============================================================================

const BUSINESS_SERVICE_COLUMNS: &[ColumnDef] = &[
    ColumnDef::string("name", "The name of the business service."),
    ColumnDef::string("id", "An unique identifier of the business service."),
    ColumnDef::string("self", "The API show URL at which the object is accessible."),
    ColumnDef::string("description", "The description of the business service."),
    ColumnDef::string(
        "html_url",
        "A URL at which the entity is uniquely displayed in the web app.",
    ),
    ColumnDef::string("point_of_contact", "The owner of the business service."),
    ColumnDef::json("team", "Reference to the team that owns the business service."),
    ColumnDef::json(
        "dependencies",
        "Services this business service depends on, and that depend on it.",
    )
    .hydrated(NULL_ON_NOT_FOUND),
    ColumnDef::string("title", "Title of the resource.").from_field("name"),
];

const BUSINESS_SERVICE_HYDRATIONS: &[Hydration] =
    &[Hydration::new("dependencies", Hydrator::BusinessDependencies)];

pub const BUSINESS_SERVICE: ResourceTable = ResourceTable::new(
    "pagerduty_business_service",
    "Business services model capabilities that span multiple technical services.",
    BUSINESS_SERVICE_COLUMNS,
    "/business_services",
    "business_services",
)
.with_item_key("business_service")
.with_hydrations(BUSINESS_SERVICE_HYDRATIONS);

// ============================================================================
// Escalation policies
// ============================================================================

const ESCALATION_POLICY_COLUMNS: &[ColumnDef] = &[
    ColumnDef::string("name", "The name of the escalation policy."),
    ColumnDef::string("id", "An unique identifier of the escalation policy."),
    ColumnDef::string("description", "The description of the escalation policy."),
    ColumnDef::string(
        "html_url",
        "A URL at which the entity is uniquely displayed in the web app.",
    ),
    ColumnDef::int(
        "num_loops",
        "The number of times the escalation policy repeats after reaching the end of its escalation.",
    ),
    ColumnDef::string("self", "The API show URL at which the object is accessible."),
    ColumnDef::string("summary", "A short-form, server-generated string describing the object."),
    ColumnDef::string("type", "The type of object."),
    ColumnDef::json("escalation_rules", "The ordered list of escalation rules for the policy."),
    ColumnDef::json("services", "Services that use this escalation policy."),
    ColumnDef::json("teams", "Teams associated with the policy."),
    ColumnDef::json("tags", "Tags attached to the escalation policy.").hydrated(NULL_ON_NOT_FOUND),
    ColumnDef::string("title", "Title of the resource.").from_field("name"),
];

const ESCALATION_POLICY_FILTERS: &[FilterMapping] =
    &[FilterMapping::new("name", FilterTarget::Query)];

const ESCALATION_POLICY_HYDRATIONS: &[Hydration] =
    &[Hydration::new("tags", Hydrator::Tags("escalation_policies"))];

pub const ESCALATION_POLICY: ResourceTable = ResourceTable::new(
    "pagerduty_escalation_policy",
    "Escalation policies define which user should be alerted at which time.",
    ESCALATION_POLICY_COLUMNS,
    "/escalation_policies",
    "escalation_policies",
)
.with_item_key("escalation_policy")
.with_filters(ESCALATION_POLICY_FILTERS)
.with_hydrations(ESCALATION_POLICY_HYDRATIONS);

// ============================================================================
// Incidents
// ============================================================================

const INCIDENT_COLUMNS: &[ColumnDef] = &[
    ColumnDef::string("id", "An unique identifier of the incident."),
    ColumnDef::int("incident_number", "The number of the incident, unique across the account."),
    ColumnDef::string("status", "The current status of the incident."),
    ColumnDef::string("urgency", "The current urgency of the incident."),
    ColumnDef::string("summary", "A short-form, server-generated string describing the object."),
    ColumnDef::timestamp("created_at", "The date/time the incident was first triggered."),
    ColumnDef::string("description", "The description of the incident."),
    ColumnDef::string(
        "html_url",
        "A URL at which the entity is uniquely displayed in the web app.",
    ),
    ColumnDef::string("incident_key", "The incident's de-duplication key."),
    ColumnDef::bool(
        "is_mergeable",
        "Whether the incident's alerts can be merged with another incident.",
    ),
    ColumnDef::timestamp(
        "last_status_change_at",
        "The time at which the status of the incident last changed.",
    ),
    ColumnDef::string("self", "The API show URL at which the object is accessible."),
    ColumnDef::string("type", "The type of object."),
    ColumnDef::json("acknowledgements", "Acknowledgements for this incident."),
    ColumnDef::json("alert_counts", "Counts of triggered and resolved alerts."),
    ColumnDef::json("assignments", "Assignments for this incident."),
    ColumnDef::json("body", "Additional incident details."),
    ColumnDef::json(
        "conference_bridge",
        "Contact information for the incident's conference bridge.",
    ),
    ColumnDef::json("escalation_policy", "The escalation policy assigned to this incident."),
    ColumnDef::json("first_trigger_log_entry", "The first log entry of the incident."),
    ColumnDef::json("last_status_change_by", "The agent that last changed the incident's status."),
    ColumnDef::json("pending_actions", "Actions scheduled to happen to the incident."),
    ColumnDef::json("priority", "The priority set for this incident."),
    ColumnDef::json("resolve_reason", "The reason the incident was resolved."),
    ColumnDef::json("service", "The impacted service."),
    ColumnDef::json("teams", "Teams involved in the incident's lifecycle."),
    ColumnDef::json("custom_fields", "Custom field values set on the incident.")
        .hydrated(NULL_ON_NOT_FOUND),
    ColumnDef::json("business_service_impacts", "Business services impacted by the incident.")
        .hydrated(NULL_ON_NOT_FOUND),
    ColumnDef::string("title", "Title of the resource.").from_field("summary"),
];

const INCIDENT_FILTERS: &[FilterMapping] = &[
    FilterMapping::new("created_at", FilterTarget::CreatedWindow),
    FilterMapping::new("incident_key", FilterTarget::IncidentKey),
    FilterMapping::new("status", FilterTarget::Statuses),
    FilterMapping::new("urgency", FilterTarget::Urgencies),
];

const INCIDENT_HYDRATIONS: &[Hydration] = &[
    Hydration::new("custom_fields", Hydrator::CustomFields),
    Hydration::new("business_service_impacts", Hydrator::BusinessServiceImpacts),
];

pub const INCIDENT: ResourceTable = ResourceTable::new(
    "pagerduty_incident",
    "An incident represents a problem or an issue that needs to be addressed and resolved.",
    INCIDENT_COLUMNS,
    "/incidents",
    "incidents",
)
.with_item_key("incident")
.with_filters(INCIDENT_FILTERS)
.with_lookback_days(INCIDENT_LOOKBACK_DAYS)
.with_hydrations(INCIDENT_HYDRATIONS);

// ============================================================================
// On-calls
// ============================================================================

const ON_CALL_COLUMNS: &[ColumnDef] = &[
    ColumnDef::int("escalation_level", "The escalation level for the on-call."),
    ColumnDef::timestamp("start", "The start of the on-call; null for a permanent on-call."),
    ColumnDef::timestamp("end", "The end of the on-call; null if the user does not go off-call."),
    ColumnDef::string("schedule_id", "ID of the schedule.").from_field("schedule.id"),
    ColumnDef::string("escalation_policy_id", "ID of the escalation policy.")
        .from_field("escalation_policy.id"),
    ColumnDef::string("user_id", "ID of the user on call.").from_field("user.id"),
    ColumnDef::json("escalation_policy", "The escalation policy."),
    ColumnDef::json("schedule", "The schedule."),
    ColumnDef::json("user_on_call", "The user on call.").from_field("user"),
];

const ON_CALL_FILTERS: &[FilterMapping] = &[
    FilterMapping::new("schedule_id", FilterTarget::Param("schedule_ids[]")),
    FilterMapping::new("escalation_policy_id", FilterTarget::Param("escalation_policy_ids[]")),
    FilterMapping::new("user_id", FilterTarget::Param("user_ids[]")),
];

pub const ON_CALL: ResourceTable = ResourceTable::new(
    "pagerduty_on_call",
    "An on-call is a contiguous stretch of time during which a user is on call for an escalation policy.",
    ON_CALL_COLUMNS,
    "/oncalls",
    "oncalls",
)
.with_filters(ON_CALL_FILTERS);

// ============================================================================
// Priorities
// ============================================================================

const PRIORITY_COLUMNS: &[ColumnDef] = &[
    ColumnDef::string("name", "The name of the priority."),
    ColumnDef::string("id", "An unique identifier of the priority."),
    ColumnDef::string("description", "The description of the priority."),
    ColumnDef::string("self", "The API show URL at which the object is accessible."),
    ColumnDef::string(
        "html_url",
        "A URL at which the entity is uniquely displayed in the web app.",
    ),
    ColumnDef::string("summary", "A short-form, server-generated string describing the object."),
    ColumnDef::string("type", "The type of object."),
    ColumnDef::string("title", "Title of the resource.").from_field("name"),
];

pub const PRIORITY: ResourceTable = ResourceTable::new(
    "pagerduty_priority",
    "Priorities set on incidents. Empty when priorities are disabled on the account.",
    PRIORITY_COLUMNS,
    "/priorities",
    "priorities",
);

// ============================================================================
// Rulesets
// ============================================================================

const RULESET_COLUMNS: &[ColumnDef] = &[
    ColumnDef::string("name", "The name of the ruleset."),
    ColumnDef::string("id", "An unique identifier of the ruleset."),
    ColumnDef::string("type", "The type of the ruleset."),
    ColumnDef::json("creator", "Reference to the user that created the ruleset."),
    ColumnDef::json("routing_keys", "Routing keys for the ruleset."),
    ColumnDef::json("team", "Reference to the team that owns the ruleset."),
    ColumnDef::json("updater", "Reference to the user that last updated the ruleset."),
    ColumnDef::string("title", "Title of the resource.").from_field("name"),
];

pub const RULESET: ResourceTable = ResourceTable::new(
    "pagerduty_ruleset",
    "Rulesets route events to an endpoint and create collections of event rules.",
    RULESET_COLUMNS,
    "/rulesets",
    "rulesets",
)
.with_item_key("ruleset");

// ============================================================================
// Schedules
// ============================================================================

const SCHEDULE_COLUMNS: &[ColumnDef] = &[
    ColumnDef::string("name", "The name of the schedule."),
    ColumnDef::string("id", "An unique identifier of the schedule."),
    ColumnDef::string("description", "The description of the schedule."),
    ColumnDef::string("time_zone", "The time zone of the schedule."),
    ColumnDef::string(
        "html_url",
        "A URL at which the entity is uniquely displayed in the web app.",
    ),
    ColumnDef::string("self", "The API show URL at which the object is accessible."),
    ColumnDef::string("summary", "A short-form, server-generated string describing the object."),
    ColumnDef::string("type", "The type of object."),
    ColumnDef::json("escalation_policies", "Escalation policies that use this schedule."),
    ColumnDef::json("final_schedule", "The rendered schedule, layers and overrides applied.")
        .hydrated(HydrationPolicy::FailRow),
    ColumnDef::json("override_sub_schedule", "The overrides applied to the schedule.")
        .hydrated(HydrationPolicy::FailRow),
    ColumnDef::json("schedule_layers", "The layers that make up the schedule.")
        .hydrated(HydrationPolicy::FailRow),
    ColumnDef::json("teams", "Teams associated with the schedule."),
    ColumnDef::json("users", "Users on the schedule."),
    ColumnDef::string("title", "Title of the resource.").from_field("name"),
];

const SCHEDULE_FILTERS: &[FilterMapping] = &[FilterMapping::new("name", FilterTarget::Query)];

const SCHEDULE_HYDRATIONS: &[Hydration] = &[
    Hydration::new("final_schedule", Hydrator::Detail("final_schedule")),
    Hydration::new("override_sub_schedule", Hydrator::Detail("override_subschedule")),
    Hydration::new("schedule_layers", Hydrator::Detail("schedule_layers")),
];

pub const SCHEDULE: ResourceTable = ResourceTable::new(
    "pagerduty_schedule",
    "A schedule determines when users are on call.",
    SCHEDULE_COLUMNS,
    "/schedules",
    "schedules",
)
.with_item_key("schedule")
.with_filters(SCHEDULE_FILTERS)
.with_hydrations(SCHEDULE_HYDRATIONS);

// ============================================================================
// Services
// ============================================================================

const SERVICE_COLUMNS: &[ColumnDef] = &[
    ColumnDef::string("name", "The name of the service."),
    ColumnDef::string("id", "An unique identifier of the service."),
    ColumnDef::string("status", "The current state of the service."),
    ColumnDef::string("self", "The API show URL at which the object is accessible."),
    ColumnDef::string("description", "The user-provided description of the service."),
    ColumnDef::int(
        "auto_resolve_timeout",
        "Seconds after which an open incident is resolved automatically.",
    ),
    ColumnDef::int(
        "acknowledgement_timeout",
        "Seconds after which an acknowledged incident re-triggers.",
    ),
    ColumnDef::string(
        "alert_creation",
        "Whether the service creates only incidents, or both incidents and alerts.",
    ),
    ColumnDef::timestamp("created_at", "The date/time when the service was created."),
    ColumnDef::string(
        "html_url",
        "A URL at which the entity is uniquely displayed in the web app.",
    ),
    ColumnDef::timestamp(
        "last_incident_timestamp",
        "The date/time of the service's most recent incident.",
    ),
    ColumnDef::string("summary", "A short-form, server-generated string describing the object."),
    ColumnDef::string("type", "The type of object."),
    ColumnDef::json(
        "alert_grouping_parameters",
        "How alerts on the service are grouped into incidents.",
    ),
    ColumnDef::json("escalation_policy", "The escalation policy used by the service."),
    ColumnDef::json("incident_urgency_rule", "How urgency is assigned to the service's incidents."),
    ColumnDef::json("integrations", "Integrations sending events to the service."),
    ColumnDef::json("scheduled_actions", "Actions scheduled for the service."),
    ColumnDef::json("support_hours", "The service's support hours."),
    ColumnDef::json("teams", "Teams associated with the service."),
    ColumnDef::json(
        "dependencies",
        "Technical services this service depends on, and that depend on it.",
    )
    .hydrated(NULL_ON_NOT_FOUND),
    ColumnDef::string("title", "Title of the resource.").from_field("name"),
];

const SERVICE_FILTERS: &[FilterMapping] = &[FilterMapping::new("name", FilterTarget::Query)];

const SERVICE_HYDRATIONS: &[Hydration] =
    &[Hydration::new("dependencies", Hydrator::TechnicalDependencies)];

pub const SERVICE: ResourceTable = ResourceTable::new(
    "pagerduty_service",
    "A service represents something you monitor, like a web service, email service or database.",
    SERVICE_COLUMNS,
    "/services",
    "services",
)
.with_item_key("service")
.with_filters(SERVICE_FILTERS)
.with_hydrations(SERVICE_HYDRATIONS);

// ============================================================================
// Tags
// ============================================================================

const TAG_COLUMNS: &[ColumnDef] = &[
    ColumnDef::string("id", "An unique identifier of the tag."),
    ColumnDef::string("label", "The label of the tag."),
    ColumnDef::string(
        "html_url",
        "A URL at which the entity is uniquely displayed in the web app.",
    ),
    ColumnDef::string("self", "The API show URL at which the object is accessible."),
    ColumnDef::string("summary", "A short-form, server-generated string describing the object."),
    ColumnDef::string("type", "The type of object."),
    ColumnDef::string("title", "Title of the resource.").from_field("label"),
];

const TAG_FILTERS: &[FilterMapping] = &[FilterMapping::new("label", FilterTarget::Query)];

pub const TAG: ResourceTable = ResourceTable::new(
    "pagerduty_tag",
    "Tags label and filter users, teams and escalation policies.",
    TAG_COLUMNS,
    "/tags",
    "tags",
)
.with_item_key("tag")
.with_filters(TAG_FILTERS);

// ============================================================================
// Teams
// ============================================================================

const TEAM_COLUMNS: &[ColumnDef] = &[
    ColumnDef::string("name", "The name of the team."),
    ColumnDef::string("id", "An unique identifier of the team."),
    ColumnDef::string("description", "The description of the team."),
    ColumnDef::string(
        "html_url",
        "A URL at which the entity is uniquely displayed in the web app.",
    ),
    ColumnDef::string("self", "The API show URL at which the object is accessible."),
    ColumnDef::string("summary", "A short-form, server-generated string describing the object."),
    ColumnDef::string("type", "The type of object."),
    ColumnDef::json("members", "Members of the team and their roles.")
        .hydrated(HydrationPolicy::FailRow),
    ColumnDef::json("tags", "Tags attached to the team.").hydrated(NULL_ON_NOT_FOUND),
    ColumnDef::string("title", "Title of the resource.").from_field("name"),
];

const TEAM_FILTERS: &[FilterMapping] = &[FilterMapping::new("name", FilterTarget::Query)];

const TEAM_HYDRATIONS: &[Hydration] = &[
    Hydration::new("members", Hydrator::TeamMembers),
    Hydration::new("tags", Hydrator::Tags("teams")),
];

pub const TEAM: ResourceTable = ResourceTable::new(
    "pagerduty_team",
    "A team is a collection of users and escalation policies that represent a group of people within an organization.",
    TEAM_COLUMNS,
    "/teams",
    "teams",
)
.with_item_key("team")
.with_filters(TEAM_FILTERS)
.with_hydrations(TEAM_HYDRATIONS);

// ============================================================================
// Users
// ============================================================================

const USER_COLUMNS: &[ColumnDef] = &[
    ColumnDef::string("name", "The name of the user."),
    ColumnDef::string("id", "An unique identifier of the user."),
    ColumnDef::string("email", "The user's email address."),
    ColumnDef::string("role", "The user role."),
    ColumnDef::bool("invitation_sent", "Whether the user has an outstanding invitation."),
    ColumnDef::string("avatar_url", "The URL of the user's avatar."),
    ColumnDef::string("color", "The schedule color for the user."),
    ColumnDef::string("description", "The user's bio."),
    ColumnDef::string("job_title", "The user's title."),
    ColumnDef::string("summary", "A short-form, server-generated string describing the object."),
    ColumnDef::string("time_zone", "The preferred time zone name."),
    ColumnDef::string("type", "The type of object."),
    ColumnDef::json("contact_methods", "The user's contact methods."),
    ColumnDef::json("notification_rules", "The user's notification rules."),
    ColumnDef::json("tags", "Tags attached to the user.").hydrated(NULL_ON_NOT_FOUND),
    ColumnDef::json("teams", "Teams the user belongs to."),
    ColumnDef::string("title", "Title of the resource.").from_field("name"),
];

const USER_FILTERS: &[FilterMapping] = &[
    FilterMapping::new("email", FilterTarget::Query),
    FilterMapping::new("name", FilterTarget::Query),
];

const USER_HYDRATIONS: &[Hydration] = &[Hydration::new("tags", Hydrator::Tags("users"))];

/// `email` and `name` both feed `query`; when both are given, `name` wins
pub const USER: ResourceTable = ResourceTable::new(
    "pagerduty_user",
    "Users are members of a PagerDuty account that can interact with incidents and other data.",
    USER_COLUMNS,
    "/users",
    "users",
)
.with_item_key("user")
.with_filters(USER_FILTERS)
.with_hydrations(USER_HYDRATIONS);

// ============================================================================
// Vendors
// ============================================================================

const VENDOR_COLUMNS: &[ColumnDef] = &[
    ColumnDef::string("name", "The short name of the vendor."),
    ColumnDef::string("id", "An unique identifier of the vendor."),
    ColumnDef::string("description", "The description of the vendor."),
    ColumnDef::string("long_name", "The full name of the vendor."),
    ColumnDef::string("website_url", "The URL of the vendor's website."),
    ColumnDef::string(
        "alert_creation_default",
        "The default alert creation mode of integrations using this vendor.",
    ),
    ColumnDef::bool("alert_creation_editable", "Whether the alert creation mode can be changed."),
    ColumnDef::string("generic_service_type", "The type of the generic service."),
    ColumnDef::string(
        "html_url",
        "A URL at which the entity is uniquely displayed in the web app.",
    ),
    ColumnDef::string("integration_guide_url", "URL of the vendor's integration guide."),
    ColumnDef::bool("is_pd_cef", "Whether the vendor sends events in the PD-CEF format."),
    ColumnDef::string("logo_url", "URL of the vendor's logo."),
    ColumnDef::string("self", "The API show URL at which the object is accessible."),
    ColumnDef::string("summary", "A short-form, server-generated string describing the object."),
    ColumnDef::string("thumbnail_url", "URL of a small thumbnail image of the vendor."),
    ColumnDef::string("type", "The type of object."),
    ColumnDef::string("title", "Title of the resource.").from_field("name"),
];

const VENDOR_FILTERS: &[FilterMapping] = &[FilterMapping::new("name", FilterTarget::Query)];

pub const VENDOR: ResourceTable = ResourceTable::new(
    "pagerduty_vendor",
    "A vendor represents a specific type of integration, such as AWS CloudWatch or Splunk.",
    VENDOR_COLUMNS,
    "/vendors",
    "vendors",
)
.with_item_key("vendor")
.with_filters(VENDOR_FILTERS);

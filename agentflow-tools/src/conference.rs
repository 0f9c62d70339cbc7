//! Simulated tools for the conference assistant.
//!
//! Each tool answers from fixed data after the context's simulated latency.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::{
    core::{Tool, ToolContext, ToolParameters, ToolResult},
    error::Result,
    registry::ToolRegistry,
};

/// Latency the demo tools pretend an upstream API takes.
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(500);

/// Travel modes understood by [`TravelTimeTool`].
pub const TRAVEL_MODES: [&str; 3] = ["driving", "walking", "public_transport"];

/// Weather forecast lookup.
#[derive(Debug, Default)]
pub struct WeatherTool;

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Get weather forecast for a specific city and date"
    }

    fn parameter_schema(&self) -> Value {
        ToolParameters::new_schema()
            .add_required("city", "string", "The city name, e.g. Cape Town")
            .add_required("date", "string", "The date in YYYY-MM-DD format")
            .into()
    }

    async fn execute(&self, params: ToolParameters, ctx: ToolContext) -> Result<ToolResult> {
        let city = params.get_string("city")?;
        ctx.simulate_latency().await;

        let forecast = if city.trim().eq_ignore_ascii_case("cape town") {
            json!({
                "temperature": "22°C",
                "condition": "Partly Cloudy",
                "humidity": "65%",
                "wind": "15 km/h",
                "precipitation": "10%",
                "recommendation": "Perfect weather for outdoor activities!"
            })
        } else {
            json!({
                "temperature": "20°C",
                "condition": "Clear",
                "humidity": "60%",
                "wind": "10 km/h",
                "precipitation": "5%"
            })
        };
        Ok(ToolResult::success(forecast))
    }
}

/// Conference venue details.
#[derive(Debug, Default)]
pub struct VenueInfoTool;

#[async_trait]
impl Tool for VenueInfoTool {
    fn name(&self) -> &str {
        "get_venue_info"
    }

    fn description(&self) -> &str {
        "Get information about a conference venue including address, capacity, and facilities"
    }

    fn parameter_schema(&self) -> Value {
        ToolParameters::new_schema()
            .add_required("venue_name", "string", "The name of the venue or conference")
            .into()
    }

    async fn execute(&self, _params: ToolParameters, ctx: ToolContext) -> Result<ToolResult> {
        ctx.simulate_latency().await;

        Ok(ToolResult::success(json!({
            "name": ".NET Conf 2025 Cape Town",
            "address": "Cape Town Convention Centre, 1 Lower Long St, Cape Town",
            "capacity": "500 attendees",
            "facilities": ["WiFi", "Parking", "Catering", "AV Equipment"],
            "start_time": "09:00 AM",
            "end_time": "05:00 PM",
            "sessions": 12,
            "tracks": ["AI/ML", ".NET Core", "Azure", "DevOps"]
        })))
    }
}

/// Travel time estimate between two places.
#[derive(Debug, Default)]
pub struct TravelTimeTool;

impl TravelTimeTool {
    fn duration_for(mode: &str) -> &'static str {
        match mode {
            "driving" => "25 minutes",
            "walking" => "1 hour 15 minutes",
            "public_transport" => "35 minutes",
            _ => "30 minutes",
        }
    }
}

#[async_trait]
impl Tool for TravelTimeTool {
    fn name(&self) -> &str {
        "calculate_travel_time"
    }

    fn description(&self) -> &str {
        "Calculate travel time between two locations"
    }

    fn parameter_schema(&self) -> Value {
        ToolParameters::new_schema()
            .add_required("from_location", "string", "Starting location")
            .add_required("to_location", "string", "Destination location")
            .add_enum("mode", &TRAVEL_MODES, "Mode of transportation")
            .into()
    }

    async fn execute(&self, params: ToolParameters, ctx: ToolContext) -> Result<ToolResult> {
        let from = params.get_string("from_location")?;
        let to = params.get_string("to_location")?;
        let mode = params
            .get_optional::<String>("mode")?
            .unwrap_or_else(|| "driving".to_string());
        ctx.simulate_latency().await;

        Ok(ToolResult::success(json!({
            "from": from,
            "to": to,
            "duration": Self::duration_for(&mode),
            "mode": mode,
            "distance": "12 km",
            "traffic": "Light traffic expected"
        })))
    }
}

/// Registry holding the three conference assistant tools.
pub async fn conference_registry() -> Result<ToolRegistry> {
    let registry = ToolRegistry::new();
    registry.register_tool(Arc::new(WeatherTool)).await?;
    registry.register_tool(Arc::new(VenueInfoTool)).await?;
    registry.register_tool(Arc::new(TravelTimeTool)).await?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    async fn run(name: &str, args: Value) -> Value {
        let registry = conference_registry().await.unwrap();
        registry
            .execute_tool(name, &args, &ToolContext::new())
            .await
            .unwrap()
            .to_payload()
    }

    #[tokio::test]
    async fn test_weather_known_and_default_city() {
        let cape_town = run(
            "get_weather",
            json!({"city": "Cape Town", "date": "2025-11-22"}),
        )
        .await;
        assert_eq!(cape_town["temperature"], json!("22°C"));
        assert_eq!(cape_town["condition"], json!("Partly Cloudy"));

        let other = run("get_weather", json!({"city": "Durban", "date": "2025-11-22"})).await;
        assert_eq!(other["temperature"], json!("20°C"));
        assert!(other.get("recommendation").is_none());
    }

    #[tokio::test]
    async fn test_venue_info() {
        let venue = run("get_venue_info", json!({"venue_name": ".NET Conf"})).await;
        assert_eq!(venue["sessions"], json!(12));
        assert_eq!(venue["capacity"], json!("500 attendees"));
    }

    #[tokio::test]
    async fn test_travel_time_modes() {
        let default_mode = run(
            "calculate_travel_time",
            json!({"from_location": "Airport", "to_location": "CTICC"}),
        )
        .await;
        assert_eq!(default_mode["mode"], json!("driving"));
        assert_eq!(default_mode["duration"], json!("25 minutes"));

        let walking = run(
            "calculate_travel_time",
            json!({"from_location": "Hotel", "to_location": "CTICC", "mode": "walking"}),
        )
        .await;
        assert_eq!(walking["duration"], json!("1 hour 15 minutes"));
    }

    #[tokio::test]
    async fn test_travel_mode_outside_enum_is_rejected() {
        let registry = conference_registry().await.unwrap();
        let result = registry
            .execute_tool(
                "calculate_travel_time",
                &json!({"from_location": "a", "to_location": "b", "mode": "teleport"}),
                &ToolContext::new(),
            )
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_registry_order_and_specs() {
        let registry = conference_registry().await.unwrap();
        let names: Vec<String> = registry
            .specs()
            .await
            .into_iter()
            .map(|spec| spec.function.name)
            .collect();
        assert_eq!(
            names,
            vec!["get_weather", "get_venue_info", "calculate_travel_time"]
        );
    }
}

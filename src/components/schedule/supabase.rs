use super::models::{NewSchedule, Schedule, ScheduleId, ScheduleUpdate};
use super::repository::ScheduleRepository;
use crate::error::{config_error, remote_error, CalendarResult, Error};
use crate::utils::time::format_date;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Method, RequestBuilder, Response};
use tracing::{debug, error};
use url::Url;

/// Schedule repository backed by a Supabase (PostgREST) table
#[derive(Debug, Clone)]
pub struct SupabaseScheduleRepository {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl SupabaseScheduleRepository {
    /// Create a repository for `table` on the project at `base_url`
    pub fn new(base_url: &str, api_key: impl Into<String>, table: &str) -> CalendarResult<Self> {
        let endpoint = table_endpoint(base_url, table)?;
        Ok(Self {
            client: Client::new(),
            endpoint,
            api_key: api_key.into(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn request(&self, method: Method) -> RequestBuilder {
        self.client
            .request(method, self.endpoint.clone())
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn read_rows(response: Response) -> CalendarResult<Vec<Schedule>> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Schedule backend returned {}: {}", status, body);
            return Err(remote_error(&format!("backend returned {}: {}", status, body)));
        }
        Ok(response.json::<Vec<Schedule>>().await?)
    }
}

/// Build `<base>/rest/v1/<table>`
pub fn table_endpoint(base_url: &str, table: &str) -> CalendarResult<Url> {
    let mut base = base_url.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    Url::parse(&base)
        .and_then(|url| url.join(&format!("rest/v1/{}", table)))
        .map_err(|e| config_error(&format!("Invalid SUPABASE_URL '{}': {}", base_url, e)))
}

#[async_trait]
impl ScheduleRepository for SupabaseScheduleRepository {
    async fn list_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> CalendarResult<Vec<Schedule>> {
        debug!("Listing schedules from {} to {}", start, end);
        let response = self
            .request(Method::GET)
            .query(&[
                ("select", "*".to_string()),
                ("date", format!("gte.{}", format_date(start))),
                ("date", format!("lte.{}", format_date(end))),
                ("order", "date.asc".to_string()),
            ])
            .send()
            .await?;
        Self::read_rows(response).await
    }

    async fn insert(&self, schedule: &NewSchedule) -> CalendarResult<Schedule> {
        let response = self
            .request(Method::POST)
            .header("Prefer", "return=representation")
            .json(&[schedule])
            .send()
            .await?;
        Self::read_rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| remote_error("insert returned no rows"))
    }

    async fn update(&self, id: &ScheduleId, changes: &ScheduleUpdate) -> CalendarResult<Schedule> {
        let response = self
            .request(Method::PATCH)
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(changes)
            .send()
            .await?;
        Self::read_rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    async fn delete(&self, id: &ScheduleId) -> CalendarResult<()> {
        let response = self
            .request(Method::DELETE)
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .send()
            .await?;
        if Self::read_rows(response).await?.is_empty() {
            return Err(Error::NotFound(id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_endpoint() {
        let url = table_endpoint("https://example.supabase.co", "calendar_schedules").unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.supabase.co/rest/v1/calendar_schedules"
        );

        let url = table_endpoint("https://example.supabase.co/", "calendar_schedules").unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.supabase.co/rest/v1/calendar_schedules"
        );
    }

    #[test]
    fn test_table_endpoint_rejects_garbage() {
        assert!(matches!(
            table_endpoint("not a url", "calendar_schedules"),
            Err(Error::Config(_))
        ));
    }
}

use crate::domain::events::EventSender;
use crate::domain::model::{ClassPreference, EnrollmentTarget};
use crate::domain::ports::BrowserDriver;
use crate::utils::error::{EnrollError, Result};

const LISTING_BODY: &str = "table.displaytable > tbody";
const LISTING_ROWS: &str = "table.displaytable > tbody > tr";
const FIRST_CELL: &str = "td:first-child";
const SECOND_CELL: &str = "td:nth-of-type(2)";
const TRACK_LINK: &str = "td:last-child > div > a";
const CLASS_LINK: &str = "td:last-child a";

/// Pick the enrollment track at the 1-based `enrollment_index` and follow
/// its link to the track's class listing page.
pub async fn open_track<D: BrowserDriver>(
    driver: &D,
    events: &EventSender,
    enroll_url: &str,
    enrollment_index: u32,
) -> Result<()> {
    events.info(format!("Navigating to {}", enroll_url));
    driver.navigate(enroll_url).await?;
    events.info(format!("Now at {}", driver.current_url().await?));

    let body = driver.find(LISTING_BODY).await?;
    let row_selector = format!("tr:nth-of-type({})", enrollment_index);
    let row = driver
        .find_optional_in(&body, &row_selector)
        .await?
        .ok_or(EnrollError::IndexOutOfRange {
            index: enrollment_index,
        })?;

    let name_cell = driver.find_in(&row, FIRST_CELL).await?;
    let track_name = driver.text(&name_cell).await?;

    let link = driver.find_in(&row, TRACK_LINK).await?;
    let href = driver
        .attr(&link, "href")
        .await?
        .ok_or_else(|| EnrollError::MissingElement {
            selector: TRACK_LINK.to_string(),
        })?;

    events.info(format!("Proceeding to enrollment in {}", track_name));
    driver.navigate(&href).await?;
    events.info(format!("Now at {}", driver.current_url().await?));

    Ok(())
}

/// Parse the class listing the driver is currently on and match it against
/// the preference index. Classes missing from the listing or without an
/// enrollment link are skipped with a warning; both are recoverable.
pub async fn match_classes<D: BrowserDriver>(
    driver: &D,
    events: &EventSender,
    index: &[ClassPreference],
) -> Result<Vec<(EnrollmentTarget, ClassPreference)>> {
    let targets = discover_targets(driver).await?;
    tracing::debug!("Discovered {} classes on the listing page", targets.len());

    let mut matched = Vec::new();
    for preference in index {
        match targets
            .iter()
            .find(|target| target.class_id == preference.class_id)
        {
            None => {
                events.warning(format!(
                    "Class {} not found in the listing, check for typos",
                    preference.class_id
                ));
            }
            Some(target) if target.href.is_none() => {
                events.warning(format!(
                    "Class {} is not open for enrollment, skipping",
                    target.class_name
                ));
            }
            Some(target) => matched.push((target.clone(), preference.clone())),
        }
    }

    Ok(matched)
}

async fn discover_targets<D: BrowserDriver>(driver: &D) -> Result<Vec<EnrollmentTarget>> {
    let mut targets = Vec::new();

    for row in driver.find_all(LISTING_ROWS).await? {
        let Some(id_cell) = driver.find_optional_in(&row, FIRST_CELL).await? else {
            continue;
        };
        let class_id = driver.text(&id_cell).await?.trim().to_string();

        let class_name = match driver.find_optional_in(&row, SECOND_CELL).await? {
            Some(cell) => driver.text(&cell).await?.trim().to_string(),
            None => String::new(),
        };

        let href = match driver.find_optional_in(&row, CLASS_LINK).await? {
            Some(anchor) => driver.attr(&anchor, "href").await?,
            None => None,
        };

        targets.push(EnrollmentTarget {
            class_id,
            class_name,
            href,
        });
    }

    Ok(targets)
}

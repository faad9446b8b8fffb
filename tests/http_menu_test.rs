use anyhow::Result;
use canteen_menu::{MenuConfig, MenuError};
use chrono::{NaiveDate, TimeZone};
use chrono_tz::Europe::Paris;
use httpmock::prelude::*;

const MENU_PAGE: &str = r#"
<html><body>
<div class="content-right"><div class="ul-container"><ul>
  <li><a href="/Files/semaine-2.csv">Semaine du 10 au 14 mars</a></li>
  <li><a href="/Files/semaine-1.csv">Semaine du 3 au 7 mars</a></li>
  <li><a href="/Files/semaine-3.csv">Semaine du 31 au 4 avril</a></li>
</ul></div></div>
<a href="/contact.aspx">Contact</a>
</body></html>
"#;

const WEEK_SHEET: &str = "\
,,,,
Restaurant d'entreprise,,,,
Menu de la semaine,,,,
,Lundi,,Mardi,
,Nom,Prix,Nom,Prix
Plat du Jour,Poulet roti basquaise,\"4,50\",Couscous,520
Trattoria,Pates bolognaise,CJ,,
Bar a Legumes,Puree,,Haricots verts,\"1,20\"
Bar a Legumes,Carottes,90,,
";

fn config_for(server: &MockServer) -> Result<MenuConfig> {
    let config = MenuConfig::from_toml_str(&format!(
        r#"
[source]
base_url = "{}"
menus_uri = "/menus"
cookie = "language=FR"
timeout_seconds = 5
"#,
        server.base_url()
    ))?;
    Ok(config)
}

#[test]
fn test_nearest_week_is_fetched_once() -> Result<()> {
    let server = MockServer::start();

    let page_mock = server.mock(|when, then| {
        when.method(GET).path("/menus");
        then.status(200)
            .header("Content-Type", "text/html; charset=utf-8")
            .body(MENU_PAGE);
    });
    let week_mock = server.mock(|when, then| {
        when.method(GET).path("/Files/semaine-1.csv");
        then.status(200).body(WEEK_SHEET);
    });

    let service = config_for(&server)?.menu_service()?;
    let now = Paris.with_ymd_and_hms(2025, 3, 4, 11, 30, 0).unwrap();
    let index = service.load_index(&now)?;

    page_mock.assert();
    assert_eq!(index.len(), 3);
    week_mock.assert_hits(0);

    let week = index.nearest(&now).expect("a week is published");
    assert_eq!(week.locator(), server.url("/Files/semaine-1.csv"));
    assert_eq!(index.current(&now).map(|p| p.locator()), Some(week.locator()));

    week.fetch_days_if_needed()?;
    week.fetch_days_if_needed()?;
    let days = week.get_days()?;
    week_mock.assert_hits(1);

    assert_eq!(days.len(), 2);
    let tuesday = week.nearest(&now)?.expect("tuesday is on the menu");
    assert_eq!(tuesday.start.date_naive(), NaiveDate::from_ymd_opt(2025, 3, 4).unwrap());
    assert_eq!(tuesday.meals.get("Plat du Jour").unwrap()[0].name, "Couscous");
    assert_eq!(tuesday.meals.get("Plat du Jour").unwrap()[0].price, Some(520));

    let monday = &days[0];
    assert_eq!(
        monday.meals.meal_types(),
        ["Plat du Jour", "Trattoria", "Bar a Légumes"]
    );
    assert_eq!(monday.meals.get("Plat du Jour").unwrap()[0].name, "Poulet rôti basquaise");
    assert_eq!(monday.meals.get("Plat du Jour").unwrap()[0].price, Some(450));
    assert_eq!(monday.meals.get("Trattoria").unwrap()[0].price, None);
    assert_eq!(monday.meals.get("Bar a Légumes").unwrap().len(), 2);

    let json = serde_json::to_value(week)?;
    assert_eq!(json["days"][0]["meals"]["Trattoria"][0]["name"], "Pâtes bolognaise");
    Ok(())
}

#[test]
fn test_month_crossing_week_and_stale_fallback() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/menus");
        then.status(200).body(MENU_PAGE);
    });

    let service = config_for(&server)?.menu_service()?;
    let now = Paris.with_ymd_and_hms(2025, 4, 2, 9, 0, 0).unwrap();
    let index = service.load_index(&now)?;

    let week = index.current(&now).expect("week crossing march and april");
    assert_eq!(week.start().date_naive(), NaiveDate::from_ymd_opt(2025, 3, 31).unwrap());
    assert_eq!(week.end().date_naive(), NaiveDate::from_ymd_opt(2025, 4, 4).unwrap());

    let later = Paris.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap();
    assert!(index.current(&later).is_none());
    assert_eq!(index.nearest(&later).unwrap().locator(), week.locator());
    Ok(())
}

#[test]
fn test_sheet_failures_are_isolated_and_retried() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/menus");
        then.status(200).body(MENU_PAGE);
    });
    let mut broken_mock = server.mock(|when, then| {
        when.method(GET).path("/Files/semaine-2.csv");
        then.status(500);
    });
    let empty_mock = server.mock(|when, then| {
        when.method(GET).path("/Files/semaine-3.csv");
        then.status(200).body("");
    });

    let service = config_for(&server)?.menu_service()?;
    let now = Paris.with_ymd_and_hms(2025, 3, 11, 9, 0, 0).unwrap();
    let index = service.load_index(&now)?;

    let broken = index.nearest(&now).unwrap();
    assert!(matches!(broken.get_days(), Err(MenuError::FetchError { .. })));
    assert!(!broken.is_resolved());

    let empty = index.periods().last().unwrap();
    assert!(matches!(empty.get_days(), Err(MenuError::EmptySourceError { .. })));
    empty_mock.assert_hits(1);

    // 修復後重新抓取
    broken_mock.delete();
    server.mock(|when, then| {
        when.method(GET).path("/Files/semaine-2.csv");
        then.status(200).body(WEEK_SHEET);
    });
    assert_eq!(broken.get_days()?.len(), 2);
    assert!(broken.is_resolved());
    Ok(())
}

#[test]
fn test_menu_page_error() -> Result<()> {
    let server = MockServer::start();
    let page_mock = server.mock(|when, then| {
        when.method(GET).path("/menus");
        then.status(503);
    });

    let service = config_for(&server)?.menu_service()?;
    let now = Paris.with_ymd_and_hms(2025, 3, 4, 11, 30, 0).unwrap();
    let result = service.load_index(&now);

    page_mock.assert();
    assert!(matches!(result, Err(MenuError::FetchError { .. })));
    Ok(())
}

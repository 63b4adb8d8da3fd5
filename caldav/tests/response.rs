// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Response parsing tests.

use duesync_caldav::MultiStatusResponse;
use duesync_ical::DateOrDateTime;

#[test]
fn response_parse_multistatus_basic() {
    let xml = "\
<?xml version=\"1.0\" encoding=\"utf-8\" ?>
<D:multistatus xmlns:D=\"DAV:\">
  <D:response>
    <D:href>/calendars/user/event1.ics</D:href>
    <D:propstat>
      <D:prop>
        <D:getetag>\"12345\"</D:getetag>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>";

    let response = MultiStatusResponse::from_xml(xml).expect("Failed to parse multistatus");

    assert_eq!(response.responses.len(), 1);
    let item = &response.responses[0];
    assert_eq!(item.href.as_str(), "/calendars/user/event1.ics");
    assert_eq!(item.prop_stats.len(), 1);
    assert!(item.prop_stats[0].is_ok());
    assert_eq!(
        item.prop_stats[0].props.etag.as_deref(),
        Some("\"12345\"")
    );
}

#[test]
fn response_parse_current_user_principal() {
    let xml = r#"<?xml version="1.0"?>
<d:multistatus xmlns:d="DAV:" xmlns:s="http://sabredav.org/ns">
  <d:response>
    <d:href>/remote.php/dav/</d:href>
    <d:propstat>
      <d:prop>
        <d:current-user-principal>
          <d:href>/remote.php/dav/principals/users/me/</d:href>
        </d:current-user-principal>
      </d:prop>
      <d:status>HTTP/1.1 200 OK</d:status>
    </d:propstat>
  </d:response>
</d:multistatus>"#;

    let response = MultiStatusResponse::from_xml(xml).expect("Failed to parse multistatus");

    assert_eq!(response.responses[0].href.as_str(), "/remote.php/dav/");
    let principal = response.find_prop(|p| p.current_user_principal.clone());
    assert_eq!(
        principal.as_deref(),
        Some("/remote.php/dav/principals/users/me/")
    );
}

#[test]
fn response_parse_calendar_home_set() {
    let xml = r#"<D:multistatus xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <D:response>
    <D:href>/principals/me/</D:href>
    <D:propstat>
      <D:prop><C:calendar-home-set><D:href>/calendars/me/</D:href></C:calendar-home-set></D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#;

    let response = MultiStatusResponse::from_xml(xml).expect("Failed to parse multistatus");
    let home = response.find_prop(|p| p.calendar_home_set.clone());
    assert_eq!(home.as_deref(), Some("/calendars/me/"));
}

#[test]
fn response_ignores_failed_propstat() {
    let xml = r#"<D:multistatus xmlns:D="DAV:">
  <D:response>
    <D:href>/</D:href>
    <D:propstat>
      <D:prop><D:current-user-principal/></D:prop>
      <D:status>HTTP/1.1 404 Not Found</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#;

    let response = MultiStatusResponse::from_xml(xml).expect("Failed to parse multistatus");
    assert!(!response.responses[0].prop_stats[0].is_ok());
    assert_eq!(response.find_prop(|p| p.current_user_principal.clone()), None);
}

#[test]
fn response_into_collections_keeps_calendars_only() {
    let xml = r#"<D:multistatus xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <D:response>
    <D:href>/calendars/me/</D:href>
    <D:propstat>
      <D:prop>
        <D:resourcetype><D:collection/></D:resourcetype>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
  <D:response>
    <D:href>/calendars/me/tasks/</D:href>
    <D:propstat>
      <D:prop>
        <D:displayname>Tasks &amp; Chores</D:displayname>
        <D:resourcetype><D:collection/><C:calendar/></D:resourcetype>
        <C:calendar-description>Due dates</C:calendar-description>
        <C:supported-calendar-component-set>
          <C:comp name="VEVENT"/>
        </C:supported-calendar-component-set>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#;

    let collections = MultiStatusResponse::from_xml(xml)
        .expect("Failed to parse multistatus")
        .into_collections();

    assert_eq!(collections.len(), 1);
    let tasks = &collections[0];
    assert_eq!(tasks.href.as_str(), "/calendars/me/tasks/");
    assert_eq!(tasks.display_name.as_deref(), Some("Tasks & Chores"));
    assert_eq!(tasks.components, ["VEVENT"]);
    assert!(tasks.accepts("VEVENT"));
    assert!(!tasks.accepts("VTODO"));
}

#[test]
fn response_into_resources_parses_calendar_data() {
    let xml = "<D:multistatus xmlns:D=\"DAV:\" xmlns:C=\"urn:ietf:params:xml:ns:caldav\">
  <D:response>
    <D:href>/calendars/me/tasks/super-productivity-t1.ics</D:href>
    <D:propstat>
      <D:prop>
        <D:getetag>\"abc\"</D:getetag>
        <C:calendar-data>BEGIN:VCALENDAR&#13;
VERSION:2.0&#13;
PRODID:-//yzx9.xyz//duesync//EN&#13;
BEGIN:VEVENT&#13;
UID:super-productivity-t1&#13;
SUMMARY:Pay rent &amp; bills&#13;
DTSTART;VALUE=DATE:20240301&#13;
DTEND;VALUE=DATE:20240302&#13;
END:VEVENT&#13;
END:VCALENDAR&#13;
</C:calendar-data>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>";

    let resources = MultiStatusResponse::from_xml(xml)
        .expect("Failed to parse multistatus")
        .into_resources()
        .expect("Failed to parse calendar data");

    assert_eq!(resources.len(), 1);
    let resource = &resources[0];
    assert_eq!(
        resource.href.as_str(),
        "/calendars/me/tasks/super-productivity-t1.ics"
    );
    assert_eq!(resource.etag.as_deref(), Some("\"abc\""));

    let event = resource.data.first_event().expect("no event");
    assert_eq!(event.uid, "super-productivity-t1");
    assert_eq!(event.summary.as_deref(), Some("Pay rent & bills"));
    assert!(matches!(event.dt_start, Some(DateOrDateTime::Date(_))));
}

#[test]
fn response_into_resources_rejects_broken_calendar_data() {
    let xml = "<D:multistatus xmlns:D=\"DAV:\" xmlns:C=\"urn:ietf:params:xml:ns:caldav\">
  <D:response>
    <D:href>/e.ics</D:href>
    <D:propstat>
      <D:prop><C:calendar-data>BEGIN:VCALENDAR</C:calendar-data></D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>";

    let result = MultiStatusResponse::from_xml(xml)
        .expect("Failed to parse multistatus")
        .into_resources();
    assert!(result.is_err());
}

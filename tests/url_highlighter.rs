//! URL highlighting labels: link styling, hit testing and pointer handling.

mod common;

use std::rc::Rc;

use notification_list::event::Propagation;
use notification_list::shell::Cursor;
use notification_list::text::{DefaultMarkup, MarkupRenderer, MonospaceGeometry, UrlHighlighter};
use notification_list::widget::Actor;

const CELL: f32 = 10.0;
const LINE: f32 = 20.0;

fn with_geometry(label: &Rc<UrlHighlighter>, wrap: Option<usize>) {
    let geometry = MonospaceGeometry::new(&label.plain_text(), CELL, LINE, wrap);
    label.set_geometry(Some(Rc::new(geometry)));
}

#[test]
fn test_highlighted_markup() {
    let h = common::harness();
    let label = UrlHighlighter::new("Read https://gnome.org/ & <b>enjoy</b>", true, &h.services);

    assert_eq!(label.text(), "Read https://gnome.org/ &amp; <b>enjoy</b>");
    assert_eq!(label.plain_text(), "Read https://gnome.org/ & enjoy");
    insta::assert_snapshot!(
        label.highlighted_markup(),
        @r##"Read <span foreground="#ccccff"><u>https://gnome.org/</u></span> &amp; <b>enjoy</b>"##
    );
}

#[test]
fn test_highlighting_keeps_surrounding_text() {
    let h = common::harness();
    let label = UrlHighlighter::new(
        "<i>first</i> www.one.org, then (http://two.org/x) — ünïcödé",
        true,
        &h.services,
    );
    insta::assert_snapshot!(
        label.highlighted_markup(),
        @r##"<i>first</i> <span foreground="#ccccff"><u>www.one.org</u></span>, then (<span foreground="#ccccff"><u>http://two.org/x</u></span>) — ünïcödé"##
    );
    assert_eq!(label.urls().len(), 2);
}

#[test]
fn test_url_before_escaped_character() {
    let h = common::harness();
    let label = UrlHighlighter::new("see http://x.org/foo' ok", false, &h.services);
    insta::assert_snapshot!(
        label.highlighted_markup(),
        @r##"see <span foreground="#ccccff"><u>http://x.org/foo</u></span>&apos; ok"##
    );
}

#[test]
fn test_quoted_url_is_styled() {
    let h = common::harness();
    let label = UrlHighlighter::new("open \"http://x.org/\" now", false, &h.services);
    assert_eq!(label.urls()[0].offset, 6);
    insta::assert_snapshot!(
        label.highlighted_markup(),
        @r##"open &quot;<span foreground="#ccccff"><u>http://x.org/</u></span>&quot; now"##
    );
}

#[test]
fn test_url_inside_sender_tag_is_styled() {
    let h = common::harness();
    let label = UrlHighlighter::new("<b>http://x.org/</b>", true, &h.services);
    insta::assert_snapshot!(
        label.highlighted_markup(),
        @r##"<b><span foreground="#ccccff"><u>http://x.org/</u></span></b>"##
    );
}

#[test]
fn test_url_across_tag_boundary_left_unstyled() {
    let h = common::harness();
    let label = UrlHighlighter::new("<b>www.split</b>.org", true, &h.services);
    assert_eq!(label.urls().len(), 1);
    assert_eq!(label.highlighted_markup(), label.text());
}

#[test]
fn test_every_url_styled_and_markup_parses() {
    let h = common::harness();
    let inputs = [
        "\"http://x.org/\"",
        "'www.gnome.org'",
        "<http://x.org/a>",
        "see http://x.org/foo' ok",
        "see http://x.org/foo\" ok",
        "see http://x.org/foo& ok",
        "http://x.org/a&b and www.two.org",
        "https://x.org/search?q=a&amp;b=c &lt;www.gnome.org&gt;",
        "<b>www.gnome.org</b> and <i>http://a.org/x</i>",
        "ünïcödé www.gnome.org &quot;https://gnome.org/&quot;",
    ];
    for input in inputs {
        for allow in [false, true] {
            let label = UrlHighlighter::new(input, allow, &h.services);
            let highlighted = label.highlighted_markup();
            assert!(
                DefaultMarkup.parse_markup(&highlighted).is_ok(),
                "{input:?} (allow={allow}) gave {highlighted:?}"
            );
            assert_eq!(
                highlighted.matches("<u>").count(),
                label.urls().len(),
                "{input:?} (allow={allow}) gave {highlighted:?}"
            );
        }
    }
}

#[test]
fn test_urls_are_offsets_into_plain_text() {
    let h = common::harness();
    let label = UrlHighlighter::new("<b>Hi</b> &amp; www.gnome.org", true, &h.services);
    let urls = label.urls();
    assert_eq!(urls.len(), 1);
    assert_eq!(urls[0].offset, 5);
    assert_eq!(urls[0].text, "www.gnome.org");
}

#[test]
fn test_set_markup_replaces_urls() {
    let h = common::harness();
    let label = UrlHighlighter::new("www.one.org", false, &h.services);
    assert_eq!(label.urls().len(), 1);
    label.set_markup("nothing here", false);
    assert!(label.urls().is_empty());
    assert_eq!(label.highlighted_markup(), "nothing here");
}

#[test]
fn test_link_color_from_theme() {
    let h = common::harness();
    let label = UrlHighlighter::new("go www.gnome.org", false, &h.services);

    label.actor().set_theme_color("link-color", "#ff8800ff");
    assert_eq!(label.link_color(), "#ff8800");
    insta::assert_snapshot!(
        label.highlighted_markup(),
        @r##"go <span foreground="#ff8800"><u>www.gnome.org</u></span>"##
    );

    label.actor().set_theme_color("other-color", "#000000");
    assert_eq!(label.link_color(), "#ff8800");
}

#[test]
fn test_set_link_color_rehighlights_without_rescan() {
    let h = common::harness();
    let label = UrlHighlighter::new("go www.gnome.org", false, &h.services);
    let urls = label.urls();
    label.set_link_color("#123456");
    assert_eq!(label.urls(), urls);
    assert!(label.highlighted_markup().contains(r##"foreground="#123456""##));
}

#[test]
fn test_find_url_at() {
    let h = common::harness();
    let label = UrlHighlighter::new("go www.gnome.org now", false, &h.services);
    with_geometry(&label, None);

    assert_eq!(label.find_url_at(5.0, 5.0), None);
    assert_eq!(label.find_url_at(35.0, 5.0), Some(0));
    assert_eq!(label.find_url_at(155.0, 10.0), Some(0));
    assert_eq!(label.find_url_at(165.0, 10.0), None);
    // Past the end of the line hits the last character.
    assert_eq!(label.find_url_at(1000.0, 10.0), None);
    // Below the text.
    assert_eq!(label.find_url_at(35.0, 25.0), None);
}

#[test]
fn test_find_url_at_prefers_last_matching_line() {
    let h = common::harness();
    let label = UrlHighlighter::new("www.gnome.org is\nhere", false, &h.services);
    with_geometry(&label, None);

    assert_eq!(label.find_url_at(35.0, 10.0), Some(0));
    // y = 20 touches both lines; the second line is scanned last and wins.
    assert_eq!(label.find_url_at(35.0, LINE), None);
    // Past the end of the first line lands on the newline.
    assert_eq!(label.find_url_at(1000.0, 10.0), None);
}

#[test]
fn test_no_geometry_no_hit() {
    let h = common::harness();
    let label = UrlHighlighter::new("www.gnome.org", false, &h.services);
    assert_eq!(label.find_url_at(5.0, 5.0), None);
}

#[test]
fn test_click_launches_url() {
    let h = common::harness();
    let label = UrlHighlighter::new("go www.gnome.org now", false, &h.services);
    with_geometry(&label, None);

    assert_eq!(label.button_press(5.0, 5.0), Propagation::Propagate);
    assert_eq!(label.button_release(5.0, 5.0), Propagation::Propagate);
    assert!(h.host.launched.borrow().is_empty());

    assert_eq!(label.button_press(45.0, 5.0), Propagation::Stop);
    assert_eq!(label.button_release(45.0, 5.0), Propagation::Stop);
    assert_eq!(*h.host.launched.borrow(), ["http://www.gnome.org"]);
}

#[test]
fn test_scheme_url_launched_as_is() {
    let h = common::harness();
    let label = UrlHighlighter::new("https://gnome.org/", false, &h.services);
    with_geometry(&label, None);
    label.button_release(5.0, 5.0);
    assert_eq!(*h.host.launched.borrow(), ["https://gnome.org/"]);
}

#[test]
fn test_motion_switches_cursor() {
    let h = common::harness();
    let label = UrlHighlighter::new("go www.gnome.org now", false, &h.services);
    with_geometry(&label, None);

    assert_eq!(label.motion(45.0, 5.0), Propagation::Propagate);
    label.motion(55.0, 5.0);
    assert_eq!(*h.host.cursors.borrow(), [Cursor::PointingHand]);

    label.motion(5.0, 5.0);
    assert_eq!(*h.host.cursors.borrow(), [Cursor::PointingHand, Cursor::Default]);

    label.leave();
    assert_eq!(h.host.cursors.borrow().len(), 2);

    label.motion(45.0, 5.0);
    label.leave();
    assert_eq!(
        *h.host.cursors.borrow(),
        [Cursor::PointingHand, Cursor::Default, Cursor::PointingHand, Cursor::Default]
    );
}

#[test]
fn test_inert_when_hidden_or_transparent() {
    let h = common::harness();
    let label = UrlHighlighter::new("www.gnome.org", false, &h.services);
    with_geometry(&label, None);

    label.actor().hide();
    assert_eq!(label.button_press(5.0, 5.0), Propagation::Propagate);
    assert_eq!(label.button_release(5.0, 5.0), Propagation::Propagate);
    label.actor().show();

    let parent = Actor::new("tray");
    parent.add_child(label.actor().clone());
    parent.set_opacity(0.0);
    assert_eq!(label.button_press(5.0, 5.0), Propagation::Propagate);
    assert_eq!(label.motion(5.0, 5.0), Propagation::Propagate);

    assert!(h.host.launched.borrow().is_empty());
    assert!(h.host.cursors.borrow().is_empty());
}

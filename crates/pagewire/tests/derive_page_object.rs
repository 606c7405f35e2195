//! `#[derive(PageObject)]` end to end.

#![allow(clippy::unwrap_used)]

use pagewire::PageObject as _;
use pagewire::{Locator, MockDriver, MockElement, Strategy};
use pagewire_derive::PageObject;

#[derive(Debug, PageObject)]
#[page(name = "login")]
struct LoginPage {
    #[locator = "id==username"]
    username: Locator,
    #[locator = "ID == password"]
    password: Locator,
    #[locator = "xpath==//button[text()=='Log in']"]
    submit: Locator,
    attempts: u32,
}

#[derive(PageObject)]
struct HomePage {
    #[locator = "linkText==Sign out"]
    sign_out: Locator,
}

#[test]
fn generated_constructor_parses_locators() {
    let page = LoginPage::new();
    assert_eq!(page.username, Locator::id("username"));
    assert_eq!(page.password.strategy(), Strategy::Id);
    assert_eq!(page.password.value(), "password");
    assert_eq!(page.submit, Locator::xpath("//button[text()=='Log in']"));
    assert_eq!(page.attempts, 0);
}

#[test]
fn trait_lists_locators_in_declaration_order() {
    let page = LoginPage::default();
    assert_eq!(page.page_name(), "login");
    let names: Vec<&str> = page.locators().into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["username", "password", "submit"]);
    assert_eq!(page.locator("submit"), Some(&page.submit));
}

#[test]
fn page_name_defaults_to_type_name() {
    let page = HomePage::new();
    assert_eq!(page.page_name(), "HomePage");
    assert_eq!(page.sign_out, Locator::link_text("Sign out"));
}

#[test]
fn is_loaded_checks_every_locator() {
    let page = HomePage::new();
    let driver = MockDriver::new();
    assert!(!page.is_loaded(&driver).unwrap());

    let driver = driver.with_element(MockElement::new("so", Locator::link_text("Sign out")));
    assert!(page.is_loaded(&driver).unwrap());
}

//! GraphQL operations used by the adapters.
//!
//! Each operation implements [`GraphQLQuery`] directly with a hand-written
//! document and typed variables/response structs, so no schema download is
//! needed at build time.

use graphql_client::{GraphQLQuery, QueryBody};
use serde::{Deserialize, Serialize};

use super::UserError;

/// Page size for GraphQL connections.
pub const GRAPHQL_PAGE_SIZE: i64 = 50;

/// Relay-style page info.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

/// A connection using the `nodes` shorthand.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    pub nodes: Vec<T>,
    pub page_info: PageInfo,
}

/// Variables for `first`/`after` paginated queries.
#[derive(Debug, Clone, Serialize)]
pub struct PageVariables {
    pub first: i64,
    pub after: Option<String>,
}

impl PageVariables {
    #[must_use]
    pub const fn after(after: Option<String>) -> Self {
        Self {
            first: GRAPHQL_PAGE_SIZE,
            after,
        }
    }
}

// =============================================================================
// Menus
// =============================================================================

/// Navigation menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Menu {
    pub id: String,
    pub handle: String,
    pub title: String,
    #[serde(default)]
    pub items: Vec<MenuItem>,
}

/// Navigation menu item, up to three levels deep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub items: Vec<MenuItem>,
}

/// `menus` query.
pub struct GetMenus;

#[derive(Debug, Deserialize)]
pub struct GetMenusData {
    pub menus: Connection<Menu>,
}

impl GraphQLQuery for GetMenus {
    type Variables = PageVariables;
    type ResponseData = GetMenusData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: GET_MENUS,
            operation_name: "GetMenus",
        }
    }
}

const GET_MENUS: &str = concat!(
    "query GetMenus($first: Int!, $after: String) {\n",
    "  menus(first: $first, after: $after) {\n",
    "    nodes {\n",
    "      id handle title\n",
    "      items { id title type url resourceId tags\n",
    "        items { id title type url resourceId tags\n",
    "          items { id title type url resourceId tags } } }\n",
    "    }\n",
    "    pageInfo { hasNextPage endCursor }\n",
    "  }\n",
    "}\n"
);

/// Shared payload of `menuCreate` / `menuUpdate`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuMutationPayload {
    pub menu: Option<Menu>,
    #[serde(default)]
    pub user_errors: Vec<UserError>,
}

/// `menuCreate` mutation.
pub struct MenuCreate;

#[derive(Debug, Clone, Serialize)]
pub struct MenuCreateVariables {
    pub title: String,
    pub handle: String,
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuCreateData {
    pub menu_create: MenuMutationPayload,
}

impl GraphQLQuery for MenuCreate {
    type Variables = MenuCreateVariables;
    type ResponseData = MenuCreateData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: MENU_CREATE,
            operation_name: "MenuCreate",
        }
    }
}

const MENU_CREATE: &str = concat!(
    "mutation MenuCreate($title: String!, $handle: String!, $items: [MenuItemCreateInput!]!) {\n",
    "  menuCreate(title: $title, handle: $handle, items: $items) {\n",
    "    menu { id handle title items { id title type url resourceId tags } }\n",
    "    userErrors { field message }\n",
    "  }\n",
    "}\n"
);

/// `menuUpdate` mutation. The `items` list replaces the menu's items, so
/// existing items must be passed back with their IDs.
pub struct MenuUpdate;

#[derive(Debug, Clone, Serialize)]
pub struct MenuUpdateVariables {
    pub id: String,
    pub title: String,
    pub handle: String,
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuUpdateData {
    pub menu_update: MenuMutationPayload,
}

impl GraphQLQuery for MenuUpdate {
    type Variables = MenuUpdateVariables;
    type ResponseData = MenuUpdateData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: MENU_UPDATE,
            operation_name: "MenuUpdate",
        }
    }
}

const MENU_UPDATE: &str = concat!(
    "mutation MenuUpdate($id: ID!, $title: String!, $handle: String!, $items: [MenuItemUpdateInput!]!) {\n",
    "  menuUpdate(id: $id, title: $title, handle: $handle, items: $items) {\n",
    "    menu { id handle title items { id title type url resourceId tags } }\n",
    "    userErrors { field message }\n",
    "  }\n",
    "}\n"
);

// =============================================================================
// Locations
// =============================================================================

/// Store location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub address: LocationAddress,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationAddress {
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub province_code: Option<String>,
    pub country_code: Option<String>,
    pub zip: Option<String>,
    pub phone: Option<String>,
}

/// `locations` query.
pub struct GetLocations;

#[derive(Debug, Deserialize)]
pub struct GetLocationsData {
    pub locations: Connection<Location>,
}

impl GraphQLQuery for GetLocations {
    type Variables = PageVariables;
    type ResponseData = GetLocationsData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: GET_LOCATIONS,
            operation_name: "GetLocations",
        }
    }
}

const GET_LOCATIONS: &str = concat!(
    "query GetLocations($first: Int!, $after: String) {\n",
    "  locations(first: $first, after: $after, includeInactive: true) {\n",
    "    nodes {\n",
    "      id name isActive\n",
    "      address { address1 address2 city provinceCode countryCode zip phone }\n",
    "    }\n",
    "    pageInfo { hasNextPage endCursor }\n",
    "  }\n",
    "}\n"
);

// =============================================================================
// Shop
// =============================================================================

/// Store-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub contact_email: Option<String>,
    pub currency_code: Option<String>,
    pub weight_unit: Option<String>,
    pub iana_timezone: Option<String>,
    #[serde(default)]
    pub taxes_included: bool,
    #[serde(default)]
    pub tax_shipping: bool,
    #[serde(default)]
    pub currency_formats: CurrencyFormats,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyFormats {
    pub money_format: Option<String>,
    pub money_with_currency_format: Option<String>,
}

/// `shop` query.
pub struct GetShop;

#[derive(Debug, Clone, Serialize)]
pub struct NoVariables {}

#[derive(Debug, Deserialize)]
pub struct GetShopData {
    pub shop: Shop,
}

impl GraphQLQuery for GetShop {
    type Variables = NoVariables;
    type ResponseData = GetShopData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: GET_SHOP,
            operation_name: "GetShop",
        }
    }
}

const GET_SHOP: &str = concat!(
    "query GetShop {\n",
    "  shop {\n",
    "    id name email contactEmail currencyCode weightUnit ianaTimezone\n",
    "    taxesIncluded taxShipping\n",
    "    currencyFormats { moneyFormat moneyWithCurrencyFormat }\n",
    "  }\n",
    "}\n"
);

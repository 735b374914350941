//! GraphQL documents sent to the Admin API.
//!
//! Each document's response shape is mirrored by a DTO in
//! [`super::types`].

/// Product fields shared by every product query.
macro_rules! product_fields {
    () => {
        r"
fragment ProductFields on Product {
  id
  title
  handle
  status
  variants(first: 1) {
    edges {
      node {
        price
        availableForSale
      }
    }
  }
  images(first: 1) {
    edges {
      node {
        url
      }
    }
  }
}"
    };
}

/// Operation name of [`GET_CUSTOMER`].
pub const GET_CUSTOMER_OPERATION: &str = "GetCustomer";

/// Customer core fields by global id. Decodes into
/// [`super::types::CustomerQueryData`].
pub const GET_CUSTOMER: &str = r"
query GetCustomer($id: ID!) {
  customer(id: $id) {
    id
    firstName
    lastName
    displayName
    email
  }
}";

/// Operation name of [`GET_PRODUCT`].
pub const GET_PRODUCT_OPERATION: &str = "GetProduct";

/// Single product by global id. Decodes into
/// [`super::types::ProductQueryData`].
pub const GET_PRODUCT: &str = concat!(
    r"
query GetProduct($id: ID!) {
  product(id: $id) {
    ...ProductFields
  }
}",
    product_fields!()
);

/// Operation name of [`GET_DEFAULT_PRODUCT`].
pub const GET_DEFAULT_PRODUCT_OPERATION: &str = "GetDefaultProduct";

/// First active product in the store. Decodes into
/// [`super::types::ProductsQueryData`].
pub const GET_DEFAULT_PRODUCT: &str = concat!(
    r#"
query GetDefaultProduct {
  products(first: 1, query: "status:active") {
    edges {
      node {
        ...ProductFields
      }
    }
  }
}"#,
    product_fields!()
);

/// Operation name of [`GET_PRODUCT_BY_HANDLE`].
pub const GET_PRODUCT_BY_HANDLE_OPERATION: &str = "GetProductByHandle";

/// Product lookup by handle through the search syntax (`handle:<value>`).
/// Decodes into [`super::types::ProductsQueryData`].
pub const GET_PRODUCT_BY_HANDLE: &str = concat!(
    r"
query GetProductByHandle($query: String!) {
  products(first: 1, query: $query) {
    edges {
      node {
        ...ProductFields
      }
    }
  }
}",
    product_fields!()
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documents_name_their_operations() {
        assert!(GET_CUSTOMER.contains("query GetCustomer("));
        assert!(GET_PRODUCT.contains("query GetProduct("));
        assert!(GET_DEFAULT_PRODUCT.contains("query GetDefaultProduct "));
        assert!(GET_PRODUCT_BY_HANDLE.contains("query GetProductByHandle("));
    }

    #[test]
    fn test_product_documents_include_fragment() {
        for document in [GET_PRODUCT, GET_DEFAULT_PRODUCT, GET_PRODUCT_BY_HANDLE] {
            assert!(document.contains("...ProductFields"));
            assert!(document.contains("fragment ProductFields on Product"));
            assert!(document.contains("availableForSale"));
        }
    }
}

use crate::catalog::Catalog;
use crate::commands::helpers::indexed_assets;
use crate::commands::CmdResult;
use crate::error::Result;
use crate::model::UploadState;

/// Lists assets newest first, optionally only those in `state`.
pub async fn run(catalog: &Catalog, state: Option<UploadState>) -> Result<CmdResult> {
    let listed = indexed_assets(catalog)
        .await
        .into_iter()
        .filter(|da| state.is_none_or(|s| da.asset.upload_state == s))
        .collect();
    Ok(CmdResult::default().with_listed_assets(listed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::Fixture;

    #[tokio::test]
    async fn lists_newest_first() {
        let fx = Fixture::new().await;
        let a = fx.add("a.jpg", b"a").await;
        let b = fx.add("b.jpg", b"b").await;
        let c = fx.add("c.jpg", b"c").await;

        let result = run(&fx.catalog, None).await.unwrap();
        let ids: Vec<_> = result.listed_assets.iter().map(|da| da.asset.id).collect();
        assert_eq!(ids, vec![c.id, b.id, a.id]);
        assert_eq!(result.listed_assets[2].index, 3);
    }

    #[tokio::test]
    async fn filter_keeps_indexes() {
        let fx = Fixture::new().await;
        let a = fx.add("a.jpg", b"a").await;
        fx.add("b.jpg", b"b").await;
        fx.catalog.begin_upload(&a.id).await.unwrap();
        fx.catalog
            .update_state(&a.id, UploadState::Failed)
            .await
            .unwrap();

        let result = run(&fx.catalog, Some(UploadState::Failed)).await.unwrap();
        assert_eq!(result.listed_assets.len(), 1);
        assert_eq!(result.listed_assets[0].index, 2);
        assert_eq!(result.listed_assets[0].asset.id, a.id);
    }

    #[tokio::test]
    async fn empty_catalog_lists_nothing() {
        let fx = Fixture::new().await;
        let result = run(&fx.catalog, None).await.unwrap();
        assert!(result.listed_assets.is_empty());
    }
}

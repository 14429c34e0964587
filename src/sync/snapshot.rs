use crate::board::models::{GroupId, ItemKey, Kanban, Product, ProductGroup, ProductId};

/// Pre-mutation copy of the items a mutation touches, with their list
/// indices, so restoring yields exactly the board that existed before.
#[derive(Debug, Clone)]
pub(crate) struct Snapshot {
    product_ids: Vec<ProductId>,
    group_ids: Vec<GroupId>,
    products: Vec<(usize, Product)>,
    groups: Vec<(usize, ProductGroup)>,
}

impl Snapshot {
    pub(crate) fn capture(board: &Kanban, keys: &[ItemKey]) -> Self {
        let mut product_ids = Vec::new();
        let mut group_ids = Vec::new();
        for key in keys {
            match key {
                ItemKey::Product(id) if !product_ids.contains(id) => product_ids.push(id.clone()),
                ItemKey::Group(id) if !group_ids.contains(id) => group_ids.push(id.clone()),
                _ => {}
            }
        }

        let products = board
            .products
            .iter()
            .enumerate()
            .filter(|(_, p)| product_ids.contains(&p.id))
            .map(|(i, p)| (i, p.clone()))
            .collect();
        let groups = board
            .product_groups
            .iter()
            .enumerate()
            .filter(|(_, g)| group_ids.contains(&g.id))
            .map(|(i, g)| (i, g.clone()))
            .collect();

        Self {
            product_ids,
            group_ids,
            products,
            groups,
        }
    }

    pub(crate) fn restore(self, board: &mut Kanban) {
        board.products.retain(|p| !self.product_ids.contains(&p.id));
        board
            .product_groups
            .retain(|g| !self.group_ids.contains(&g.id));

        // Captured in ascending index order, so each insert lands where it was.
        for (index, product) in self.products {
            let index = index.min(board.products.len());
            board.products.insert(index, product);
        }
        for (index, group) in self.groups {
            let index = index.min(board.product_groups.len());
            board.product_groups.insert(index, group);
        }
    }
}

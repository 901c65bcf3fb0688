//! Static tables used by the built-in generators.

/// Alphabet for random strings and e-mail local parts.
pub const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyz1234567890ABCDEFGHIJKLMNOPQRSTUVWXYZ";

pub const MOBILE_PHONE_LEN: usize = 11;

pub const MOBILE_PHONE_PREFIXES: &[&str] = &[
    "130", "131", "132", "133", "134", "135", "136", "137", "138", "139", "145", "147", "150",
    "151", "152", "153", "155", "156", "157", "158", "159", "166", "170", "171", "172", "173",
    "175", "176", "177", "178", "180", "181", "182", "183", "184", "185", "186", "187", "188",
    "189", "192", "195", "198", "199",
];

pub const EMAIL_DOMAINS: &[&str] = &[
    "@qq.com",
    "@163.com",
    "@139.com",
    "@sohu.com",
    "@aliyun.com",
    "@189.com",
    "@hotmail.com",
    "@gmail.com",
    "@sina.com",
    "@yahoo.com",
    "@outlook.com",
];

/// Inclusive bounds of the e-mail local part length.
pub const EMAIL_LOCAL_LEN: (usize, usize) = (7, 12);

#[derive(Debug, Clone, Copy)]
pub struct Province {
    pub name: &'static str,
    pub cities: &'static [City],
}

#[derive(Debug, Clone, Copy)]
pub struct City {
    pub name: &'static str,
    pub counties: &'static [&'static str],
}

/// Province, city and county hierarchy for address generation.
pub const AREAS: &[Province] = &[
    Province {
        name: "北京市",
        cities: &[City {
            name: "北京市",
            counties: &["东城区", "西城区", "朝阳区", "海淀区", "丰台区", "通州区"],
        }],
    },
    Province {
        name: "上海市",
        cities: &[City {
            name: "上海市",
            counties: &["黄浦区", "徐汇区", "长宁区", "静安区", "浦东新区"],
        }],
    },
    Province {
        name: "广东省",
        cities: &[
            City {
                name: "广州市",
                counties: &["越秀区", "海珠区", "天河区", "白云区", "番禺区"],
            },
            City {
                name: "深圳市",
                counties: &["福田区", "罗湖区", "南山区", "宝安区", "龙岗区"],
            },
            City {
                name: "佛山市",
                counties: &["禅城区", "南海区", "顺德区"],
            },
        ],
    },
    Province {
        name: "浙江省",
        cities: &[
            City {
                name: "杭州市",
                counties: &["上城区", "拱墅区", "西湖区", "滨江区", "余杭区"],
            },
            City {
                name: "宁波市",
                counties: &["海曙区", "江北区", "鄞州区", "慈溪市"],
            },
        ],
    },
    Province {
        name: "四川省",
        cities: &[
            City {
                name: "成都市",
                counties: &["锦江区", "青羊区", "金牛区", "武侯区", "成华区"],
            },
            City {
                name: "绵阳市",
                counties: &["涪城区", "游仙区", "江油市"],
            },
        ],
    },
    Province {
        name: "湖北省",
        cities: &[
            City {
                name: "武汉市",
                counties: &["江岸区", "江汉区", "武昌区", "洪山区"],
            },
            City {
                name: "宜昌市",
                counties: &["西陵区", "伍家岗区", "夷陵区"],
            },
        ],
    },
];
